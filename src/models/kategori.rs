#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kategori {
    Pendapatan,
    Pembelanjaan,
    Pembiayaan,
}

impl Kategori {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendapatan => "Pendapatan",
            Self::Pembelanjaan => "Pembelanjaan",
            Self::Pembiayaan => "Pembiayaan",
        }
    }

    /// Case-insensitive match against the three known categories.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pendapatan" => Some(Self::Pendapatan),
            "pembelanjaan" | "belanja" => Some(Self::Pembelanjaan),
            "pembiayaan" => Some(Self::Pembiayaan),
            _ => None,
        }
    }

    pub fn all() -> &'static [Kategori] {
        &[Self::Pendapatan, Self::Pembelanjaan, Self::Pembiayaan]
    }

    /// English gloss shown next to the Indonesian label.
    pub fn gloss(&self) -> &'static str {
        match self {
            Self::Pendapatan => "Revenue",
            Self::Pembelanjaan => "Expenditure",
            Self::Pembiayaan => "Financing",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Pendapatan => Self::Pembelanjaan,
            Self::Pembelanjaan => Self::Pembiayaan,
            Self::Pembiayaan => Self::Pendapatan,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::Pendapatan => Self::Pembiayaan,
            Self::Pembelanjaan => Self::Pendapatan,
            Self::Pembiayaan => Self::Pembelanjaan,
        }
    }
}

impl std::fmt::Display for Kategori {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Kategori {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            anyhow::anyhow!("Unknown kategori '{s}' (expected Pendapatan, Pembelanjaan or Pembiayaan)")
        })
    }
}
