//! Code-page resolution for character data and field names.

use encoding_rs::{Encoding, IBM866, UTF_8, WINDOWS_1251};

/// National-language code page stored in the table header.
///
/// The header carries a single language-driver byte; the engine resolves it
/// once on open and again whenever the code page is changed. Changing the
/// code page never re-encodes bytes that are already on disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Codepage {
    /// Header byte 0: no code page recorded.
    #[default]
    NotSet,
    /// Header byte 38 or 101: DOS Cyrillic.
    Ibm866,
    /// Header byte 201: Windows Cyrillic.
    Windows1251,
    /// Any other header byte: unknown but not a hard failure.
    Unspecified,
}

impl Codepage {
    /// Resolve a stored language-driver byte to a code page.
    pub fn from_storage_byte(byte: u8) -> Self {
        match byte {
            0 => Codepage::NotSet,
            38 | 101 => Codepage::Ibm866,
            201 => Codepage::Windows1251,
            _ => Codepage::Unspecified,
        }
    }

    /// The byte written back to the header for this code page.
    ///
    /// `Unspecified` has no stable byte representation and cannot be written.
    pub fn storage_byte(self) -> Option<u8> {
        match self {
            Codepage::NotSet => Some(0),
            Codepage::Ibm866 => Some(101),
            Codepage::Windows1251 => Some(201),
            Codepage::Unspecified => None,
        }
    }

    /// The text encoding used for character fields and field names.
    ///
    /// `NotSet` and `Unspecified` fall back to UTF-8.
    pub fn encoding(self) -> &'static Encoding {
        match self {
            Codepage::Ibm866 => IBM866,
            Codepage::Windows1251 => WINDOWS_1251,
            Codepage::NotSet | Codepage::Unspecified => UTF_8,
        }
    }
}
