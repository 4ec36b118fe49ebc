mod kategori;
mod record;

pub use kategori::Kategori;
pub use record::{BudgetRecord, NewRecord};
#[cfg(test)]
pub use record::parse_jumlah;
