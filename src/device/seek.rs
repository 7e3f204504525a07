//! Seek arithmetic

use crate::error::{Result, ScullError};

/// Origin of a seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Whence {
    /// From offset 0
    Set = 0,
    /// From the caller's current position
    Cur = 1,
    /// From the device's current size
    End = 2,
}

impl Whence {
    /// Decode a raw `SEEK_*` value
    pub fn from_raw(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(Whence::Set),
            1 => Ok(Whence::Cur),
            2 => Ok(Whence::End),
            other => Err(ScullError::InvalidArgument(format!("unknown whence {}", other))),
        }
    }
}

/// Compute the new position for a seek
///
/// Pure arithmetic: seeking past `size` is allowed, a negative or
/// unrepresentable result is `InvalidArgument`.
pub fn resolve_seek(current: u64, size: u64, offset: i64, whence: Whence) -> Result<u64> {
    let base = match whence {
        Whence::Set => 0,
        Whence::Cur => current as i128,
        Whence::End => size as i128,
    };
    let new_pos = base + offset as i128;

    if new_pos < 0 {
        return Err(ScullError::InvalidArgument(format!(
            "seek to negative position {}",
            new_pos
        )));
    }
    u64::try_from(new_pos)
        .map_err(|_| ScullError::InvalidArgument(format!("seek position {} out of range", new_pos)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whence_from_raw() {
        assert_eq!(Whence::from_raw(0).unwrap(), Whence::Set);
        assert_eq!(Whence::from_raw(1).unwrap(), Whence::Cur);
        assert_eq!(Whence::from_raw(2).unwrap(), Whence::End);
        assert!(matches!(Whence::from_raw(3), Err(ScullError::InvalidArgument(_))));
        assert!(matches!(Whence::from_raw(-1), Err(ScullError::InvalidArgument(_))));
    }

    #[test]
    fn test_resolve_each_origin() {
        assert_eq!(resolve_seek(10, 100, 5, Whence::Set).unwrap(), 5);
        assert_eq!(resolve_seek(10, 100, 5, Whence::Cur).unwrap(), 15);
        assert_eq!(resolve_seek(10, 100, -5, Whence::End).unwrap(), 95);
    }

    #[test]
    fn test_resolve_past_end_is_legal() {
        assert_eq!(resolve_seek(0, 100, 1_000, Whence::End).unwrap(), 1_100);
    }

    #[test]
    fn test_resolve_negative_fails() {
        assert!(matches!(
            resolve_seek(10, 100, -11, Whence::Cur),
            Err(ScullError::InvalidArgument(_))
        ));
        assert!(matches!(
            resolve_seek(0, 0, -1, Whence::Set),
            Err(ScullError::InvalidArgument(_))
        ));
    }
}
