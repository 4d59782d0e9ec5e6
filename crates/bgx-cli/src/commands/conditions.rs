//! Conditions command

use anyhow::Result;
use bgx_color::{Background, Presets};

pub fn run() -> Result<()> {
    let presets = Presets::new()?;

    println!(
        "{:<8} {:>6} {:>6} {:>6} {:>8} {:>6} {:>6} {:>8}",
        "name", "Y_w", "L_A", "Y_b", "F_L", "n", "z", "A_w"
    );
    for bg in Background::ALL {
        let vc = presets.get(bg);
        println!(
            "{:<8} {:>6.1} {:>6.1} {:>6.1} {:>8.5} {:>6.3} {:>6.3} {:>8.4}",
            bg.name(),
            vc.y_w,
            vc.l_a,
            vc.y_b,
            vc.f_l(),
            vc.n(),
            vc.z(),
            vc.a_w()
        );
    }
    Ok(())
}
