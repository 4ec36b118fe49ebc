mod csv_import;

pub(crate) use csv_import::{read_records, write_records};
