use std::fmt;

/// Display unit for size metrics, as binary multiples of a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeUnit {
    #[default]
    Bytes,
    KiB,
    MiB,
    GiB,
    TiB,
    PiB,
}

impl SizeUnit {
    /// Anything other than the five recognized unit names means raw bytes.
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            Some("KiB") => SizeUnit::KiB,
            Some("MiB") => SizeUnit::MiB,
            Some("GiB") => SizeUnit::GiB,
            Some("TiB") => SizeUnit::TiB,
            Some("PiB") => SizeUnit::PiB,
            _ => SizeUnit::Bytes,
        }
    }

    pub fn divisor(self) -> f64 {
        let exponent = match self {
            SizeUnit::Bytes => 0,
            SizeUnit::KiB => 1,
            SizeUnit::MiB => 2,
            SizeUnit::GiB => 3,
            SizeUnit::TiB => 4,
            SizeUnit::PiB => 5,
        };
        1024f64.powi(exponent)
    }

    pub fn scale(self, bytes: u64) -> f64 {
        bytes as f64 / self.divisor()
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SizeUnit::Bytes => "bytes",
            SizeUnit::KiB => "KiB",
            SizeUnit::MiB => "MiB",
            SizeUnit::GiB => "GiB",
            SizeUnit::TiB => "TiB",
            SizeUnit::PiB => "PiB",
        };
        f.write_str(name)
    }
}
