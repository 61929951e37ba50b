use anyhow::Result;
use serde::Serialize;

use super::Settings;

#[derive(Serialize)]
struct ThicknessResponse {
    elevation: f64,
    thickness: f64,
    mantle_density: f64,
    crust_density: f64,
    reference_thickness: f64,
}

pub fn run(settings: &Settings, elevation: f64, json: bool) -> Result<()> {
    let params = settings.params()?;
    let thickness = params.thickness(elevation);

    if json {
        let response = ThicknessResponse {
            elevation,
            thickness,
            mantle_density: params.mantle_density,
            crust_density: params.crust_density,
            reference_thickness: params.reference_thickness,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{:.2}", thickness);
    }

    Ok(())
}
