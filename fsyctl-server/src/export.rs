//! Company member CSV export

use chrono::NaiveDate;

use crate::db::repos::MemberExportRow;

pub const MEMBER_CSV_HEADER: [&str; 10] = [
    "FSY ID",
    "First Name",
    "Last Name",
    "Stake Name",
    "Participant Type",
    "Phone Number",
    "Email",
    "Group Name",
    "Company Name",
    "Joined Date",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Download filename for an export taken on `date`.
pub fn members_filename(date: NaiveDate) -> String {
    format!("company-members-{}.csv", date.format("%Y-%m-%d"))
}

/// Write the header and one record per member to `out`.
pub fn write_members<W: std::io::Write>(
    out: W,
    rows: &[MemberExportRow],
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(MEMBER_CSV_HEADER)?;

    for row in rows {
        writer.write_record([
            row.fsy_id.to_string(),
            row.first_name.clone(),
            row.last_name.clone(),
            row.stake_name.clone().unwrap_or_default(),
            row.participant_type.clone(),
            row.phone_number.clone().unwrap_or_default(),
            row.email.clone().unwrap_or_default(),
            row.group_name.clone(),
            row.company_name.clone(),
            row.joined_at.format("%Y-%m-%d").to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Render the export into memory.
pub fn members_csv(rows: &[MemberExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_members(&mut buf, rows)?;
    Ok(buf)
}
