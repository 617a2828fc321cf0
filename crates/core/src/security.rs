//! Document permission flags.
//!
//! Only the permission-bit mapping of the standard security handler is
//! modelled here; key derivation and content decryption are out of
//! scope for the binding layer.

use crate::error::{PdfError, Result};
use bitflags::bitflags;

bitflags! {
    /// User-access permission flags (the P value of the encryption
    /// dictionary). Bit numbers follow the PDF 32000-1 table: bit 3 is
    /// value 1 << 2, and so on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Permissions: u32 {
        /// Bit 3: print the document.
        const PRINT = 1 << 2;
        /// Bit 4: modify contents.
        const MODIFY = 1 << 3;
        /// Bit 5: copy or extract text and graphics.
        const COPY = 1 << 4;
        /// Bit 6: add or modify annotations and form fields.
        const ANNOTATE = 1 << 5;
        /// Bit 9: fill in existing form fields and sign.
        const FILL_FORMS = 1 << 8;
        /// Bit 10: extract for accessibility.
        const ACCESSIBILITY = 1 << 9;
        /// Bit 11: assemble the document.
        const ASSEMBLE = 1 << 10;
        /// Bit 12: print at full resolution.
        const HIGH_QUALITY_PRINT = 1 << 11;
    }
}

impl Permissions {
    /// Interpret a raw P value, ignoring the reserved bits.
    pub const fn from_p_value(p: u32) -> Self {
        Self::from_bits_truncate(p)
    }

    /// Whether the given protection option is granted.
    pub const fn allows(self, option: ProtectionOption) -> bool {
        self.contains(option.required_bit())
    }
}

/// The closed set of permission queries exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionOption {
    Copy,
    Print,
    Edit,
    EditNotes,
    FillAndSign,
    Accessible,
    DocAssembly,
    HighPrint,
}

impl ProtectionOption {
    /// Each option consults exactly one permission bit. In particular
    /// `Print` checks the print bit, not the modify bit.
    pub const fn required_bit(self) -> Permissions {
        match self {
            Self::Copy => Permissions::COPY,
            Self::Print => Permissions::PRINT,
            Self::Edit => Permissions::MODIFY,
            Self::EditNotes => Permissions::ANNOTATE,
            Self::FillAndSign => Permissions::FILL_FORMS,
            Self::Accessible => Permissions::ACCESSIBILITY,
            Self::DocAssembly => Permissions::ASSEMBLE,
            Self::HighPrint => Permissions::HIGH_QUALITY_PRINT,
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        match key {
            "Copy" => Ok(Self::Copy),
            "Print" => Ok(Self::Print),
            "Edit" => Ok(Self::Edit),
            "EditNotes" => Ok(Self::EditNotes),
            "FillAndSign" => Ok(Self::FillAndSign),
            "Accessible" => Ok(Self::Accessible),
            "DocAssembly" => Ok(Self::DocAssembly),
            "HighPrint" => Ok(Self::HighPrint),
            other => Err(PdfError::UnknownProtectionOption(other.to_string())),
        }
    }
}
