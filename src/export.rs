// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::session::api::Mod;
use crate::session::SubmissionPayload;

#[derive(Debug, Serialize)]
pub struct ModCsvRecord {
    #[serde(rename = "mod")]
    pub name: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

fn mod_to_csv_record(m: &Mod) -> ModCsvRecord {
    ModCsvRecord {
        name: m.name.clone(),
        x: m.x,
        y: m.y,
    }
}

/// Write mods as CSV rows into any writer
pub fn write_mods_csv<W: Write>(mods: &[Mod], out: W) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = Writer::from_writer(out);
    for m in mods {
        writer.serialize(mod_to_csv_record(m))?;
    }
    writer.flush()?;
    Ok(())
}

/// Export a device's mods to a CSV file
pub fn export_mods_to_csv<P: AsRef<Path>>(
    mods: &[Mod],
    file_path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(file_path.as_ref())?;
    write_mods_csv(mods, file)?;
    log::info!(
        "[PASS] Exported {} mods to {}",
        mods.len(),
        file_path.as_ref().display()
    );
    Ok(())
}

/// Save a submission payload as pretty-printed JSON
pub fn export_submission<P: AsRef<Path>>(
    payload: &SubmissionPayload,
    file_path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(file_path.as_ref())?;
    serde_json::to_writer_pretty(file, payload)?;
    log::info!(
        "[PASS] Saved submission of {} dies for {} to {}",
        payload.dies.len(),
        payload.device,
        file_path.as_ref().display()
    );
    Ok(())
}
