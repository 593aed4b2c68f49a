// Conversion contract between literals and a host engine's own representation

use crate::error::{AdapterError, Direction, Result};
use crate::literal::Literal;

/// Bidirectional mapping between [`Literal`] and a host literal type.
///
/// `lift` must accept every host value the host can produce, failing with
/// [`AdapterError::Unrepresentable`] only for values that have no literal
/// equivalent. `lower` receives a host-specific context carrying target type
/// hints the host needs but a literal does not record (e.g. whether a 64-bit
/// float was spelled `FLOAT` or `DOUBLE`).
///
/// Implementations walk composites depth-first, converting children in order.
pub trait LiteralAdapter {
    type Host;
    type Context: Default;

    fn lift(&self, host: &Self::Host) -> Result<Literal>;

    fn lower(&self, literal: &Literal, context: &Self::Context) -> Result<Self::Host>;
}

/// Lower a literal and lift it back, returning the literal the host returned.
///
/// Equal output means the host preserves the value exactly.
pub fn round_trip<A: LiteralAdapter>(
    adapter: &A,
    literal: &Literal,
    context: &A::Context,
) -> Result<Literal> {
    let host = adapter.lower(literal, context)?;
    adapter.lift(&host)
}

/// Shorthand for the error every adapter raises on a gap in its mapping
pub fn unrepresentable(
    kind: impl Into<String>,
    direction: Direction,
    reason: impl Into<String>,
) -> AdapterError {
    AdapterError::Unrepresentable {
        kind: kind.into(),
        direction,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};
    use crate::literal::Value;

    // Host that only knows 64-bit integers
    struct WideInts;

    impl LiteralAdapter for WideInts {
        type Host = i64;
        type Context = ();

        fn lift(&self, host: &i64) -> Result<Literal> {
            Ok(Literal::i64(false, *host))
        }

        fn lower(&self, literal: &Literal, _: &()) -> Result<i64> {
            match literal.value() {
                Value::I8(v) => Ok(i64::from(*v)),
                Value::I16(v) => Ok(i64::from(*v)),
                Value::I32(v) => Ok(i64::from(*v)),
                Value::I64(v) => Ok(*v),
                _ => Err(unrepresentable(
                    literal.ty().to_string(),
                    Direction::Lower,
                    "only integers",
                )
                .into()),
            }
        }
    }

    #[test]
    fn test_round_trip_reports_widening() {
        let lit = Literal::i64(false, 7);
        assert_eq!(round_trip(&WideInts, &lit, &()).unwrap(), lit);

        let narrow = Literal::i16(false, 7);
        assert_ne!(round_trip(&WideInts, &narrow, &()).unwrap(), narrow);
    }

    #[test]
    fn test_unrepresentable() {
        let err: Error = round_trip(&WideInts, &Literal::bool(false, true), &()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unrepresentable);
        assert_eq!(
            err.to_string(),
            "Adapter error: bool has no equivalent on the host side: only integers"
        );
    }
}
