//! Format variants
//!
//! Six container flavors share one structure and differ only in byte order
//! and the magic tags of their six variant-owned sections. The offset
//! table, footer and end marker tags are common to all of them.

use std::str::FromStr;

use crate::endian::Endianness;

/// Magic tags of the variant-owned sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantMagic {
    pub info: [u8; 4],
    pub texture: [u8; 4],
    pub effect: [u8; 4],
    pub bones: [u8; 4],
    pub object: [u8; 4],
    pub motion: [u8; 4],
}

const fn magic(prefix: u8) -> VariantMagic {
    VariantMagic {
        info: [b'N', prefix, b'I', b'F'],
        texture: [b'N', prefix, b'T', b'L'],
        effect: [b'N', prefix, b'E', b'F'],
        bones: [b'N', prefix, b'N', b'N'],
        object: [b'N', prefix, b'O', b'B'],
        motion: [b'N', prefix, b'M', b'O'],
    }
}

/// One of the six known container flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVariant {
    Xno,
    Zno,
    Ino,
    Gno,
    Eno,
    Yno,
}

impl FormatVariant {
    /// Byte order of the whole file
    pub fn endianness(self) -> Endianness {
        match self {
            Self::Xno | Self::Zno | Self::Ino => Endianness::Little,
            Self::Gno | Self::Eno | Self::Yno => Endianness::Big,
        }
    }

    /// Magic tags of the variant-owned sections. YNO carries its own info
    /// tag but reuses the XNO tags for everything else.
    pub fn magic(self) -> VariantMagic {
        match self {
            Self::Xno => magic(b'X'),
            Self::Zno => magic(b'Z'),
            Self::Ino => magic(b'I'),
            Self::Gno => magic(b'G'),
            Self::Eno => magic(b'E'),
            Self::Yno => VariantMagic {
                info: *b"NYIF",
                ..magic(b'X')
            },
        }
    }

    /// Detect the variant from a file name, the way the loaders always
    /// have: case-insensitive substring match on the known extensions.
    /// YNO files carry no extension of their own and need an explicit
    /// override.
    pub fn from_path(path: &str) -> Option<Self> {
        let lowered = path.to_lowercase();
        let matches = |extensions: &[&str]| extensions.iter().any(|e| lowered.contains(e));

        if matches(&[".xno", ".xnm"]) {
            Some(Self::Xno)
        } else if matches(&[".zno", ".znm"]) {
            Some(Self::Zno)
        } else if matches(&[".ino", ".inm"]) {
            Some(Self::Ino)
        } else if matches(&[".gno", ".gnm", ".gna"]) {
            Some(Self::Gno)
        } else if matches(&[".eno"]) {
            Some(Self::Eno)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Xno => "XNO",
            Self::Zno => "ZNO",
            Self::Ino => "INO",
            Self::Gno => "GNO",
            Self::Eno => "ENO",
            Self::Yno => "YNO",
        }
    }
}

impl FromStr for FormatVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xno" => Ok(Self::Xno),
            "zno" => Ok(Self::Zno),
            "ino" => Ok(Self::Ino),
            "gno" => Ok(Self::Gno),
            "eno" => Ok(Self::Eno),
            "yno" => Ok(Self::Yno),
            other => Err(format!("unknown variant \"{other}\"")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_tables() {
        assert_eq!(&FormatVariant::Xno.magic().info, b"NXIF");
        assert_eq!(&FormatVariant::Zno.magic().object, b"NZOB");
        assert_eq!(&FormatVariant::Ino.magic().bones, b"NINN");
        assert_eq!(&FormatVariant::Gno.magic().texture, b"NGTL");
        assert_eq!(&FormatVariant::Eno.magic().motion, b"NEMO");
        // YNO: own info tag, XNO tags otherwise
        assert_eq!(&FormatVariant::Yno.magic().info, b"NYIF");
        assert_eq!(&FormatVariant::Yno.magic().effect, b"NXEF");
    }

    #[test]
    fn test_endianness_split() {
        assert_eq!(FormatVariant::Xno.endianness(), Endianness::Little);
        assert_eq!(FormatVariant::Ino.endianness(), Endianness::Little);
        assert_eq!(FormatVariant::Gno.endianness(), Endianness::Big);
        assert_eq!(FormatVariant::Yno.endianness(), Endianness::Big);
    }

    #[test]
    fn test_extension_detection() {
        assert_eq!(
            FormatVariant::from_path("player/sonic_Root.xno"),
            Some(FormatVariant::Xno)
        );
        assert_eq!(
            FormatVariant::from_path("STAGE.GNA"),
            Some(FormatVariant::Gno)
        );
        assert_eq!(
            FormatVariant::from_path("enemy.znm"),
            Some(FormatVariant::Zno)
        );
        assert_eq!(FormatVariant::from_path("object.bin"), None);
    }
}
