use argh::FromArgs;
use glam::{DMat3, DVec3};

use lgmath::{so3, Rotation, Transformation};

#[derive(FromArgs)]
/// Accumulate a long chain of small motions and report how far the
/// rotation block drifts off SO(3).
struct Args {
    /// number of compositions to accumulate
    #[argh(option, default = "100_000")]
    steps: usize,

    /// rotation angle of each step in radians
    #[argh(option, default = "0.01")]
    angle: f64,

    /// compose raw matrices only, without reprojection
    #[argh(switch)]
    no_reproject: bool,
}

/// Determinant error and orthogonality error of a rotation block.
fn drift(c: &DMat3) -> (f64, f64) {
    let det_err = (c.determinant() - 1.0).abs();
    let ortho = c.transpose() * *c - DMat3::IDENTITY;
    let ortho_err = [ortho.x_axis, ortho.y_axis, ortho.z_axis]
        .iter()
        .map(|col| col.length_squared())
        .sum::<f64>()
        .sqrt();
    (det_err, ortho_err)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.steps == 0 {
        return Err("steps must be positive".into());
    }

    let axis = DVec3::new(1.0, -2.0, 0.5).normalize();
    let aaxis = axis * args.angle;

    let step_rot = Rotation::from_vec(aaxis);
    let step_tran =
        Transformation::from_vec(&[0.01, 0.0, -0.02, aaxis.x, aaxis.y, aaxis.z]);

    // raw matrix products, never corrected
    let mut raw = DMat3::IDENTITY;
    for _ in 0..args.steps {
        raw *= step_rot.matrix();
    }
    let (det_err, ortho_err) = drift(&raw);
    log::info!(
        "raw product after {} steps: |det - 1| = {:.3e}, |C^T C - I| = {:.3e}",
        args.steps,
        det_err,
        ortho_err
    );

    if args.no_reproject {
        println!("raw: det_err={det_err:.3e} ortho_err={ortho_err:.3e}");
        return Ok(());
    }

    let mut rot = Rotation::IDENTITY;
    let mut tran = Transformation::IDENTITY;
    for _ in 0..args.steps {
        rot *= step_rot;
        tran *= step_tran;
    }

    let (rot_det, rot_ortho) = drift(&rot.matrix());
    log::info!(
        "rotation after {} steps: |det - 1| = {:.3e}, |C^T C - I| = {:.3e}",
        args.steps,
        rot_det,
        rot_ortho
    );

    let (tran_det, tran_ortho) = drift(&tran.c_ba());
    log::info!(
        "transformation after {} steps: |det - 1| = {:.3e}, |C^T C - I| = {:.3e}",
        args.steps,
        tran_det,
        tran_ortho
    );

    // forced reprojection of the raw chain for comparison
    let (fixed_det, fixed_ortho) = drift(&so3::reproject(raw, true));
    log::debug!("raw product after forced reprojection: {fixed_det:.3e} {fixed_ortho:.3e}");

    println!("raw:            det_err={det_err:.3e} ortho_err={ortho_err:.3e}");
    println!("rotation:       det_err={rot_det:.3e} ortho_err={rot_ortho:.3e}");
    println!("transformation: det_err={tran_det:.3e} ortho_err={tran_ortho:.3e}");
    println!("final pose:\n{tran}");

    Ok(())
}
