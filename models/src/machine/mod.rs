pub mod builder;

use std::fmt;

/// A managed machine the controller operates on.
///
/// The address is both the transport destination and the membership key;
/// two machines with the same address are the same participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Machine {
    pub name: String,
    pub address: String,
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.address {
            f.write_str(&self.address)
        } else {
            write!(f, "{} ({})", self.name, self.address)
        }
    }
}
