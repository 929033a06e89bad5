use crate::app::candidate::CandidateProfile;
use crate::domain::model::ChartPoint;
use crate::utils::error::Result;
use std::io::Write;
use std::path::Path;

/// Write chart series as CSV with a `series,name,value` header.
pub fn write_chart_csv<W: Write>(writer: W, series: &[(&str, &[ChartPoint])]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["series", "name", "value"])?;
    for (label, points) in series {
        for point in points.iter() {
            csv_writer.write_record([*label, point.name.as_str(), point.value.to_string().as_str()])?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_profile_csv(profile: &CandidateProfile, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_chart_csv(
        file,
        &[
            ("sectors", profile.sector_chart.as_slice()),
            ("contributors", profile.contributor_chart.as_slice()),
        ],
    )?;
    tracing::info!("📁 Chart data exported to {}", path.display());
    Ok(())
}
