//! CSV export of a dry-run plan.

use std::io::Write;
use std::path::Path;

use crate::error::RunError;
use crate::runner::PlanRow;

pub fn write_plan<W: Write>(writer: W, rows: &[PlanRow]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_plan_csv(path: &Path, rows: &[PlanRow]) -> Result<(), RunError> {
    let report_err = |source| RunError::Report {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path).map_err(|err| report_err(csv::Error::from(err)))?;
    write_plan(file, rows).map_err(report_err)
}
