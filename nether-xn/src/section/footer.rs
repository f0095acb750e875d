//! Footer section (NFN0)
//!
//! Eight reserved bytes and the container's display name, usually the
//! source file name the asset pipeline saw.

use super::{SectionHeader, write_framed};
use crate::cursor::{ReadCursor, WriteCursor};
use crate::{Result, TAG_FOOTER};

#[derive(Debug, Default, Clone)]
pub struct FooterSection {
    pub header: SectionHeader,
    pub name: String,
}

impl FooterSection {
    pub fn new(name: &str) -> Self {
        Self {
            header: SectionHeader::default(),
            name: name.to_string(),
        }
    }

    pub(crate) fn read(cursor: &mut ReadCursor) -> Result<Self> {
        let header = SectionHeader::read(cursor)?;
        cursor.skip(8);
        let name = cursor.read_null_terminated_string()?;
        Ok(Self { header, name })
    }

    pub(crate) fn write(&mut self, cursor: &mut WriteCursor) -> Result<()> {
        let name = self.name.clone();
        self.header = write_framed(cursor, TAG_FOOTER, |cursor, _| {
            cursor.write_zeros(8);
            cursor.write_null_terminated_string(&name);
            Ok(())
        })?;
        Ok(())
    }
}
