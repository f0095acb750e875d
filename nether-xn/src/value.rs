//! Typed values the cursors can move
//!
//! Scalars are corrected through the single swap routine in [`crate::endian`];
//! composite math types are ordered sequences of `f32` fields, each corrected
//! independently.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::Result;
use crate::cursor::{ReadCursor, WriteCursor};
use crate::endian::{Endianness, correct_bytes};

/// A value with a fixed on-disk layout readable/writable by the cursors
pub trait CursorValue: Sized + Copy {
    fn read_from(cursor: &mut ReadCursor, endianness: Endianness) -> Result<Self>;
    fn write_to(self, cursor: &mut WriteCursor, endianness: Endianness);
}

macro_rules! scalar_value {
    ($($ty:ty => $label:literal),* $(,)?) => {$(
        impl CursorValue for $ty {
            fn read_from(cursor: &mut ReadCursor, endianness: Endianness) -> Result<Self> {
                let raw = cursor.consume::<{ std::mem::size_of::<$ty>() }>($label)?;
                Ok(<$ty>::from_ne_bytes(correct_bytes(raw, endianness)))
            }

            fn write_to(self, cursor: &mut WriteCursor, endianness: Endianness) {
                cursor.emit(&correct_bytes(self.to_ne_bytes(), endianness));
            }
        }
    )*};
}

scalar_value! {
    u8 => "u8",
    i8 => "i8",
    u16 => "u16",
    i16 => "i16",
    u32 => "u32",
    i32 => "i32",
    u64 => "u64",
    i64 => "i64",
    f32 => "f32",
    f64 => "f64",
}

impl CursorValue for Vec2 {
    fn read_from(cursor: &mut ReadCursor, endianness: Endianness) -> Result<Self> {
        let x = f32::read_from(cursor, endianness)?;
        let y = f32::read_from(cursor, endianness)?;
        Ok(Vec2::new(x, y))
    }

    fn write_to(self, cursor: &mut WriteCursor, endianness: Endianness) {
        self.x.write_to(cursor, endianness);
        self.y.write_to(cursor, endianness);
    }
}

impl CursorValue for Vec3 {
    fn read_from(cursor: &mut ReadCursor, endianness: Endianness) -> Result<Self> {
        let x = f32::read_from(cursor, endianness)?;
        let y = f32::read_from(cursor, endianness)?;
        let z = f32::read_from(cursor, endianness)?;
        Ok(Vec3::new(x, y, z))
    }

    fn write_to(self, cursor: &mut WriteCursor, endianness: Endianness) {
        self.x.write_to(cursor, endianness);
        self.y.write_to(cursor, endianness);
        self.z.write_to(cursor, endianness);
    }
}

impl CursorValue for Vec4 {
    fn read_from(cursor: &mut ReadCursor, endianness: Endianness) -> Result<Self> {
        let x = f32::read_from(cursor, endianness)?;
        let y = f32::read_from(cursor, endianness)?;
        let z = f32::read_from(cursor, endianness)?;
        let w = f32::read_from(cursor, endianness)?;
        Ok(Vec4::new(x, y, z, w))
    }

    fn write_to(self, cursor: &mut WriteCursor, endianness: Endianness) {
        self.x.write_to(cursor, endianness);
        self.y.write_to(cursor, endianness);
        self.z.write_to(cursor, endianness);
        self.w.write_to(cursor, endianness);
    }
}

impl CursorValue for Quat {
    fn read_from(cursor: &mut ReadCursor, endianness: Endianness) -> Result<Self> {
        let x = f32::read_from(cursor, endianness)?;
        let y = f32::read_from(cursor, endianness)?;
        let z = f32::read_from(cursor, endianness)?;
        let w = f32::read_from(cursor, endianness)?;
        Ok(Quat::from_xyzw(x, y, z, w))
    }

    fn write_to(self, cursor: &mut WriteCursor, endianness: Endianness) {
        self.x.write_to(cursor, endianness);
        self.y.write_to(cursor, endianness);
        self.z.write_to(cursor, endianness);
        self.w.write_to(cursor, endianness);
    }
}

impl CursorValue for Mat4 {
    fn read_from(cursor: &mut ReadCursor, endianness: Endianness) -> Result<Self> {
        let x_axis = Vec4::read_from(cursor, endianness)?;
        let y_axis = Vec4::read_from(cursor, endianness)?;
        let z_axis = Vec4::read_from(cursor, endianness)?;
        let w_axis = Vec4::read_from(cursor, endianness)?;
        Ok(Mat4::from_cols(x_axis, y_axis, z_axis, w_axis))
    }

    fn write_to(self, cursor: &mut WriteCursor, endianness: Endianness) {
        self.x_axis.write_to(cursor, endianness);
        self.y_axis.write_to(cursor, endianness);
        self.z_axis.write_to(cursor, endianness);
        self.w_axis.write_to(cursor, endianness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_both_orders() {
        let mut writer = WriteCursor::new(Endianness::Little);
        0x11223344u32.write_to(&mut writer, Endianness::Little);
        0x11223344u32.write_to(&mut writer, Endianness::Big);
        assert_eq!(
            writer.as_bytes(),
            &[0x44, 0x33, 0x22, 0x11, 0x11, 0x22, 0x33, 0x44]
        );
    }

    #[test]
    fn test_composite_round_trip() {
        let quat = Quat::from_xyzw(0.5, -0.25, 0.125, 1.0);
        let matrix = Mat4::from_cols(
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 3.0, 0.0),
            Vec4::new(4.0, 5.0, 6.0, 1.0),
        );

        let mut writer = WriteCursor::new(Endianness::Big);
        quat.write_to(&mut writer, Endianness::Big);
        matrix.write_to(&mut writer, Endianness::Big);

        let mut reader = ReadCursor::from_bytes(writer.into_bytes(), Endianness::Big);
        assert_eq!(Quat::read_from(&mut reader, Endianness::Big).unwrap(), quat);
        assert_eq!(
            Mat4::read_from(&mut reader, Endianness::Big).unwrap(),
            matrix
        );
    }
}
