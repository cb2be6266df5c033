/// Primitive field of a payload layout. All multi-byte fields are little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
}

impl Field {
    /// Width of the field on the wire, in bytes.
    pub const fn width(self) -> usize {
        match self {
            Field::U8 | Field::I8 => 1,
            Field::U16 | Field::I16 => 2,
            Field::U32 | Field::I32 => 4,
        }
    }

    /// Smallest and largest value the field can hold.
    pub const fn range(self) -> (i64, i64) {
        match self {
            Field::U8 => (u8::MIN as i64, u8::MAX as i64),
            Field::I8 => (i8::MIN as i64, i8::MAX as i64),
            Field::U16 => (u16::MIN as i64, u16::MAX as i64),
            Field::I16 => (i16::MIN as i64, i16::MAX as i64),
            Field::U32 => (u32::MIN as i64, u32::MAX as i64),
            Field::I32 => (i32::MIN as i64, i32::MAX as i64),
        }
    }

    /// Reads the field from the start of `buf`, which must hold at least `width()` bytes.
    pub(crate) fn read(self, buf: &[u8]) -> i64 {
        match self {
            Field::U8 => buf[0] as i64,
            Field::I8 => buf[0] as i8 as i64,
            Field::U16 => u16::from_le_bytes([buf[0], buf[1]]) as i64,
            Field::I16 => i16::from_le_bytes([buf[0], buf[1]]) as i64,
            Field::U32 => u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as i64,
            Field::I32 => i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as i64,
        }
    }

    /// Appends `value` to `out`. Returns `false` if the value does not fit.
    pub(crate) fn write(self, value: i64, out: &mut Vec<u8>) -> bool {
        let (min, max) = self.range();
        if value < min || value > max {
            return false;
        }

        // The range check above makes every cast below lossless
        match self {
            Field::U8 | Field::I8 => out.push(value as u8),
            Field::U16 | Field::I16 => out.extend_from_slice(&(value as u16).to_le_bytes()),
            Field::U32 | Field::I32 => out.extend_from_slice(&(value as u32).to_le_bytes()),
        }
        true
    }
}

/// Total width of a layout in bytes.
pub const fn layout_size(layout: &[Field]) -> usize {
    let mut size = 0;
    let mut i = 0;
    while i < layout.len() {
        size += layout[i].width();
        i += 1;
    }
    size
}
