//! Param types and typed values.
//!
//! Every param carries one of a closed set of types. The type is written
//! explicitly in the text (`name:TYPE = value`), so values are never sniffed:
//! the declared type decides which grammar reads the value text.
//!
//! - Scalars: decimal text, `Bool` as `true`/`false`
//! - Vectors: `1, 2, 3` (exact component count)
//! - Matrices: `[[a, b, c] [d, e, f] [g, h, i]]` (row-major, exact element count)
//! - `String`: raw text, quoting is handled by the parser and writer

use std::fmt;

use phf::phf_map;

use crate::error::ValueError;

/// The type tag of a param.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// No value. Never produced by the parser.
    None,
    S32,
    S64,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Vec2S32,
    Vec3S32,
    Vec4S32,
    Vec2U32,
    Vec3U32,
    Vec4U32,
    Vec2F32,
    Vec3F32,
    Vec4F32,
    Vec2B,
    Vec3B,
    Vec4B,
    Vec4S8,
    Vec4U8,
    /// 3x3 float matrix, 9 elements.
    Mat3F32,
    /// 4x4 float matrix, 16 elements.
    Mat4F32,
    /// 3x4 affine transform, written as 4 rows of 3.
    TMat,
    String,
}

/// Type names accepted in `name:TYPE = value`.
///
/// Canonical names first, then the short aliases older files use.
static TYPE_BY_NAME: phf::Map<&'static str, ParamType> = phf_map! {
    "S32" => ParamType::S32,
    "S64" => ParamType::S64,
    "U32" => ParamType::U32,
    "U64" => ParamType::U64,
    "F32" => ParamType::F32,
    "F64" => ParamType::F64,
    "Bool" => ParamType::Bool,
    "Vec2S32" => ParamType::Vec2S32,
    "Vec3S32" => ParamType::Vec3S32,
    "Vec4S32" => ParamType::Vec4S32,
    "Vec2U32" => ParamType::Vec2U32,
    "Vec3U32" => ParamType::Vec3U32,
    "Vec4U32" => ParamType::Vec4U32,
    "Vec2F32" => ParamType::Vec2F32,
    "Vec3F32" => ParamType::Vec3F32,
    "Vec4F32" => ParamType::Vec4F32,
    "Vec2B" => ParamType::Vec2B,
    "Vec3B" => ParamType::Vec3B,
    "Vec4B" => ParamType::Vec4B,
    "Vec4S8" => ParamType::Vec4S8,
    "Vec4U8" => ParamType::Vec4U8,
    "Mat3F32" => ParamType::Mat3F32,
    "Mat4F32" => ParamType::Mat4F32,
    "TMat" => ParamType::TMat,
    "String" => ParamType::String,

    "Vec2S" => ParamType::Vec2S32,
    "Vec3S" => ParamType::Vec3S32,
    "Vec4S" => ParamType::Vec4S32,
    "Vec2U" => ParamType::Vec2U32,
    "Vec3U" => ParamType::Vec3U32,
    "Vec4U" => ParamType::Vec4U32,
    "Vec2F" => ParamType::Vec2F32,
    "Vec3F" => ParamType::Vec3F32,
    "Vec4F" => ParamType::Vec4F32,
    "Mat3F" => ParamType::Mat3F32,
    "Mat4F" => ParamType::Mat4F32,
};

impl ParamType {
    /// Every type that has a text form, in declaration order.
    pub const ALL: [ParamType; 25] = [
        ParamType::S32,
        ParamType::S64,
        ParamType::U32,
        ParamType::U64,
        ParamType::F32,
        ParamType::F64,
        ParamType::Bool,
        ParamType::Vec2S32,
        ParamType::Vec3S32,
        ParamType::Vec4S32,
        ParamType::Vec2U32,
        ParamType::Vec3U32,
        ParamType::Vec4U32,
        ParamType::Vec2F32,
        ParamType::Vec3F32,
        ParamType::Vec4F32,
        ParamType::Vec2B,
        ParamType::Vec3B,
        ParamType::Vec4B,
        ParamType::Vec4S8,
        ParamType::Vec4U8,
        ParamType::Mat3F32,
        ParamType::Mat4F32,
        ParamType::TMat,
        ParamType::String,
    ];

    /// Canonical name, as written by the serializer.
    pub fn name(self) -> &'static str {
        match self {
            ParamType::None => "None",
            ParamType::S32 => "S32",
            ParamType::S64 => "S64",
            ParamType::U32 => "U32",
            ParamType::U64 => "U64",
            ParamType::F32 => "F32",
            ParamType::F64 => "F64",
            ParamType::Bool => "Bool",
            ParamType::Vec2S32 => "Vec2S32",
            ParamType::Vec3S32 => "Vec3S32",
            ParamType::Vec4S32 => "Vec4S32",
            ParamType::Vec2U32 => "Vec2U32",
            ParamType::Vec3U32 => "Vec3U32",
            ParamType::Vec4U32 => "Vec4U32",
            ParamType::Vec2F32 => "Vec2F32",
            ParamType::Vec3F32 => "Vec3F32",
            ParamType::Vec4F32 => "Vec4F32",
            ParamType::Vec2B => "Vec2B",
            ParamType::Vec3B => "Vec3B",
            ParamType::Vec4B => "Vec4B",
            ParamType::Vec4S8 => "Vec4S8",
            ParamType::Vec4U8 => "Vec4U8",
            ParamType::Mat3F32 => "Mat3F32",
            ParamType::Mat4F32 => "Mat4F32",
            ParamType::TMat => "TMat",
            ParamType::String => "String",
        }
    }

    /// Look up a type by canonical name or alias.
    ///
    /// `None` has no name and is never returned.
    pub fn from_name(name: &str) -> Option<ParamType> {
        TYPE_BY_NAME.get(name).copied()
    }

    /// Number of components: 1 for scalars and strings, N for vectors,
    /// element count for matrices, 0 for `None`.
    pub fn arity(self) -> usize {
        match self {
            ParamType::None => 0,
            ParamType::S32
            | ParamType::S64
            | ParamType::U32
            | ParamType::U64
            | ParamType::F32
            | ParamType::F64
            | ParamType::Bool
            | ParamType::String => 1,
            ParamType::Vec2S32 | ParamType::Vec2U32 | ParamType::Vec2F32 | ParamType::Vec2B => 2,
            ParamType::Vec3S32 | ParamType::Vec3U32 | ParamType::Vec3F32 | ParamType::Vec3B => 3,
            ParamType::Vec4S32
            | ParamType::Vec4U32
            | ParamType::Vec4F32
            | ParamType::Vec4B
            | ParamType::Vec4S8
            | ParamType::Vec4U8 => 4,
            ParamType::Mat3F32 => 9,
            ParamType::Mat4F32 => 16,
            ParamType::TMat => 12,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed param value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    None,
    S32(i32),
    S64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Vec2S32([i32; 2]),
    Vec3S32([i32; 3]),
    Vec4S32([i32; 4]),
    Vec2U32([u32; 2]),
    Vec3U32([u32; 3]),
    Vec4U32([u32; 4]),
    Vec2F32([f32; 2]),
    Vec3F32([f32; 3]),
    Vec4F32([f32; 4]),
    Vec2B([bool; 2]),
    Vec3B([bool; 3]),
    Vec4B([bool; 4]),
    Vec4S8([i8; 4]),
    Vec4U8([u8; 4]),
    /// Row-major 3x3.
    Mat3F32([f32; 9]),
    /// Row-major 4x4.
    Mat4F32([f32; 16]),
    /// Row-major 4 rows of 3 (rotation rows then translation).
    TMat([f32; 12]),
    String(String),
}

impl ParamValue {
    /// The type tag of this value.
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::None => ParamType::None,
            ParamValue::S32(_) => ParamType::S32,
            ParamValue::S64(_) => ParamType::S64,
            ParamValue::U32(_) => ParamType::U32,
            ParamValue::U64(_) => ParamType::U64,
            ParamValue::F32(_) => ParamType::F32,
            ParamValue::F64(_) => ParamType::F64,
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Vec2S32(_) => ParamType::Vec2S32,
            ParamValue::Vec3S32(_) => ParamType::Vec3S32,
            ParamValue::Vec4S32(_) => ParamType::Vec4S32,
            ParamValue::Vec2U32(_) => ParamType::Vec2U32,
            ParamValue::Vec3U32(_) => ParamType::Vec3U32,
            ParamValue::Vec4U32(_) => ParamType::Vec4U32,
            ParamValue::Vec2F32(_) => ParamType::Vec2F32,
            ParamValue::Vec3F32(_) => ParamType::Vec3F32,
            ParamValue::Vec4F32(_) => ParamType::Vec4F32,
            ParamValue::Vec2B(_) => ParamType::Vec2B,
            ParamValue::Vec3B(_) => ParamType::Vec3B,
            ParamValue::Vec4B(_) => ParamType::Vec4B,
            ParamValue::Vec4S8(_) => ParamType::Vec4S8,
            ParamValue::Vec4U8(_) => ParamType::Vec4U8,
            ParamValue::Mat3F32(_) => ParamType::Mat3F32,
            ParamValue::Mat4F32(_) => ParamType::Mat4F32,
            ParamValue::TMat(_) => ParamType::TMat,
            ParamValue::String(_) => ParamType::String,
        }
    }

    /// Try to get the string payload.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the payload as a native Rust value.
    #[inline]
    pub fn get<T: ParamData>(&self) -> Option<T> {
        T::from_value(self)
    }

    /// Read `text` as a value of type `ty`.
    ///
    /// Non-string text is trimmed first. `String` text is taken verbatim;
    /// unescaping is the parser's job.
    pub fn parse(ty: ParamType, text: &str) -> Result<ParamValue, ValueError> {
        if ty == ParamType::String {
            return Ok(ParamValue::String(text.to_owned()));
        }

        let text = text.trim();
        let value = match ty {
            ParamType::None => return Err(ValueError::Untyped),
            ParamType::S32 => ParamValue::S32(scalar(ty, text)?),
            ParamType::S64 => ParamValue::S64(scalar(ty, text)?),
            ParamType::U32 => ParamValue::U32(scalar(ty, text)?),
            ParamType::U64 => ParamValue::U64(scalar(ty, text)?),
            ParamType::F32 => ParamValue::F32(scalar(ty, text)?),
            ParamType::F64 => ParamValue::F64(scalar(ty, text)?),
            ParamType::Bool => ParamValue::Bool(scalar(ty, text)?),
            ParamType::Vec2S32 => ParamValue::Vec2S32(vector(ty, text)?),
            ParamType::Vec3S32 => ParamValue::Vec3S32(vector(ty, text)?),
            ParamType::Vec4S32 => ParamValue::Vec4S32(vector(ty, text)?),
            ParamType::Vec2U32 => ParamValue::Vec2U32(vector(ty, text)?),
            ParamType::Vec3U32 => ParamValue::Vec3U32(vector(ty, text)?),
            ParamType::Vec4U32 => ParamValue::Vec4U32(vector(ty, text)?),
            ParamType::Vec2F32 => ParamValue::Vec2F32(vector(ty, text)?),
            ParamType::Vec3F32 => ParamValue::Vec3F32(vector(ty, text)?),
            ParamType::Vec4F32 => ParamValue::Vec4F32(vector(ty, text)?),
            ParamType::Vec2B => ParamValue::Vec2B(vector(ty, text)?),
            ParamType::Vec3B => ParamValue::Vec3B(vector(ty, text)?),
            ParamType::Vec4B => ParamValue::Vec4B(vector(ty, text)?),
            ParamType::Vec4S8 => ParamValue::Vec4S8(vector(ty, text)?),
            ParamType::Vec4U8 => ParamValue::Vec4U8(vector(ty, text)?),
            ParamType::Mat3F32 => ParamValue::Mat3F32(matrix(ty, text)?),
            ParamType::Mat4F32 => ParamValue::Mat4F32(matrix(ty, text)?),
            ParamType::TMat => ParamValue::TMat(matrix(ty, text)?),
            ParamType::String => unreachable!("handled above"),
        };
        Ok(value)
    }
}

impl fmt::Display for ParamValue {
    /// Formats the value text as it appears after `=` (strings unquoted).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::None => Ok(()),
            ParamValue::S32(v) => write!(f, "{v}"),
            ParamValue::S64(v) => write!(f, "{v}"),
            ParamValue::U32(v) => write!(f, "{v}"),
            ParamValue::U64(v) => write!(f, "{v}"),
            ParamValue::F32(v) => write!(f, "{v}"),
            ParamValue::F64(v) => write!(f, "{v}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Vec2S32(v) => write_list(f, v),
            ParamValue::Vec3S32(v) => write_list(f, v),
            ParamValue::Vec4S32(v) => write_list(f, v),
            ParamValue::Vec2U32(v) => write_list(f, v),
            ParamValue::Vec3U32(v) => write_list(f, v),
            ParamValue::Vec4U32(v) => write_list(f, v),
            ParamValue::Vec2F32(v) => write_list(f, v),
            ParamValue::Vec3F32(v) => write_list(f, v),
            ParamValue::Vec4F32(v) => write_list(f, v),
            ParamValue::Vec2B(v) => write_list(f, v),
            ParamValue::Vec3B(v) => write_list(f, v),
            ParamValue::Vec4B(v) => write_list(f, v),
            ParamValue::Vec4S8(v) => write_list(f, v),
            ParamValue::Vec4U8(v) => write_list(f, v),
            ParamValue::Mat3F32(v) => write_rows(f, v, 3),
            ParamValue::Mat4F32(v) => write_rows(f, v, 4),
            ParamValue::TMat(v) => write_rows(f, v, 3),
            ParamValue::String(s) => f.write_str(s),
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_rows(f: &mut fmt::Formatter<'_>, items: &[f32], columns: usize) -> fmt::Result {
    f.write_str("[")?;
    for (i, row) in items.chunks(columns).enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        f.write_str("[")?;
        write_list(f, row)?;
        f.write_str("]")?;
    }
    f.write_str("]")
}

// ============================================================================
// Scalar readers
// ============================================================================

/// A single component that can be read from text.
trait Scalar: Copy + Default {
    fn read(text: &str) -> Option<Self>;
}

macro_rules! impl_integer_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                #[inline]
                fn read(text: &str) -> Option<Self> {
                    <$ty>::try_from(parse_integer(text.as_bytes())?).ok()
                }
            }
        )*
    };
}

impl_integer_scalar!(i8, u8, i32, u32, i64, u64);

impl Scalar for f32 {
    #[inline]
    fn read(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl Scalar for f64 {
    #[inline]
    fn read(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl Scalar for bool {
    /// `true`/`false` in any case, or `1`/`0`.
    fn read(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("true") || text == "1" {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") || text == "0" {
            Some(false)
        } else {
            None
        }
    }
}

/// Parse an integer: optional sign, decimal or `0x`/`0o`/`0b` prefixed
/// digits, `_` separators allowed. Returns None on overflow or bad digits.
fn parse_integer(bytes: &[u8]) -> Option<i128> {
    let (negative, rest) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    let (radix, digits) = if rest.len() > 2 && rest[0] == b'0' {
        match rest[1] {
            b'x' | b'X' => (16, &rest[2..]),
            b'o' | b'O' => (8, &rest[2..]),
            b'b' | b'B' => (2, &rest[2..]),
            _ => (10, rest),
        }
    } else {
        (10, rest)
    };

    let mut result: i128 = 0;
    let mut seen_digit = false;
    for &b in digits {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            b'_' if seen_digit => continue,
            _ => return None,
        };
        if u32::from(digit) >= radix {
            return None;
        }
        result = result
            .checked_mul(i128::from(radix))?
            .checked_add(i128::from(digit))?;
        seen_digit = true;
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -result } else { result })
}

fn scalar<T: Scalar>(ty: ParamType, text: &str) -> Result<T, ValueError> {
    T::read(text).ok_or_else(|| ValueError::Malformed {
        ty,
        text: text.to_owned(),
    })
}

fn vector<T: Scalar, const N: usize>(ty: ParamType, text: &str) -> Result<[T; N], ValueError> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(ValueError::Arity {
            ty,
            expected: N,
            found: parts.len(),
        });
    }

    let mut out = [T::default(); N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = scalar(ty, part)?;
    }
    Ok(out)
}

fn matrix<const N: usize>(ty: ParamType, text: &str) -> Result<[f32; N], ValueError> {
    let elements: Vec<&str> = text
        .split(|c: char| c == '[' || c == ']' || c == ',' || c.is_ascii_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if elements.len() != N {
        return Err(ValueError::Arity {
            ty,
            expected: N,
            found: elements.len(),
        });
    }

    let mut out = [0.0f32; N];
    for (slot, element) in out.iter_mut().zip(elements) {
        *slot = scalar(ty, element)?;
    }
    Ok(out)
}

// ============================================================================
// Native payload conversion
// ============================================================================

/// A native Rust type that maps onto exactly one [`ParamType`].
///
/// Used by the generic block accessors (`get_param_value`, `add_param_value`).
pub trait ParamData: Sized {
    const TYPE: ParamType;

    fn into_value(self) -> ParamValue;

    /// Extract the payload if `value` has this type.
    fn from_value(value: &ParamValue) -> Option<Self>;
}

macro_rules! impl_param_data {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl ParamData for $native {
                const TYPE: ParamType = ParamType::$variant;

                #[inline]
                fn into_value(self) -> ParamValue {
                    ParamValue::$variant(self)
                }

                #[inline]
                fn from_value(value: &ParamValue) -> Option<Self> {
                    match value {
                        ParamValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_param_data! {
    i32 => S32,
    i64 => S64,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    [i32; 2] => Vec2S32,
    [i32; 3] => Vec3S32,
    [i32; 4] => Vec4S32,
    [u32; 2] => Vec2U32,
    [u32; 3] => Vec3U32,
    [u32; 4] => Vec4U32,
    [f32; 2] => Vec2F32,
    [f32; 3] => Vec3F32,
    [f32; 4] => Vec4F32,
    [bool; 2] => Vec2B,
    [bool; 3] => Vec3B,
    [bool; 4] => Vec4B,
    [i8; 4] => Vec4S8,
    [u8; 4] => Vec4U8,
    [f32; 9] => Mat3F32,
    [f32; 16] => Mat4F32,
    [f32; 12] => TMat,
    String => String,
}
