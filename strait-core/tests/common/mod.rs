// Test utilities and generators for strait property-based testing

#![allow(dead_code)]

use proptest::prelude::*;
use strait_core::decimal::{max_unscaled, Decimal};
use strait_core::time::{Date, IntervalDayTime, IntervalYearMonth, TimeOfDay, Timestamp};
use strait_core::time::MICROS_PER_DAY;
use strait_core::{Kind, Literal, Type};

/// Generate decimal type parameters
pub fn arb_decimal_parameters() -> impl Strategy<Value = (u8, u8)> {
    (1u8..=38).prop_flat_map(|precision| (Just(precision), 0..=precision))
}

/// Generate a Type with limited recursion depth
pub fn arb_type_depth(depth: u32) -> BoxedStrategy<Type> {
    let leaf = (
        any::<bool>(),
        prop_oneof![
            Just(Kind::Bool),
            Just(Kind::I8),
            Just(Kind::I16),
            Just(Kind::I32),
            Just(Kind::I64),
            Just(Kind::Fp32),
            Just(Kind::Fp64),
            Just(Kind::String),
            Just(Kind::Binary),
            (0u32..6).prop_map(|length| Kind::FixedChar { length }),
            (0u32..12).prop_map(|length| Kind::VarChar { length }),
            (0u32..6).prop_map(|length| Kind::FixedBinary { length }),
            arb_decimal_parameters()
                .prop_map(|(precision, scale)| Kind::Decimal { precision, scale }),
            Just(Kind::Date),
            Just(Kind::Time),
            Just(Kind::Timestamp),
            Just(Kind::TimestampTz),
            Just(Kind::IntervalYear),
            Just(Kind::IntervalDay),
        ],
    )
        .prop_map(|(nullable, kind)| Type::new(kind, nullable).expect("valid leaf kind"));

    leaf.prop_recursive(depth, 32, 4, |inner| {
        prop_oneof![
            (inner.clone(), any::<bool>()).prop_map(|(element, n)| Type::list(element, n)),
            (inner.clone(), inner.clone(), any::<bool>())
                .prop_map(|(key, value, n)| Type::map(key, value, n)),
            (prop::collection::vec(inner, 0..4), any::<bool>())
                .prop_map(|(fields, n)| Type::strukt(fields, n)),
        ]
    })
    .boxed()
}

/// Generate a reasonable Type (depth 3)
pub fn arb_type() -> BoxedStrategy<Type> {
    arb_type_depth(3)
}

fn arb_chars(min: usize, max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), min..=max).prop_map(String::from_iter)
}

/// Which floats a generator may produce
#[derive(Clone, Copy, Debug)]
pub enum Floats {
    /// Every bit pattern class: NaN, infinities, signed zeros, subnormals
    Any,
    /// Finite values only, as JSON cannot carry the rest
    Finite,
}

/// Generate a non-null literal whose type is exactly `ty`
fn arb_value_for_type(ty: &Type, floats: Floats) -> BoxedStrategy<Literal> {
    let n = ty.is_nullable();
    match ty.kind().clone() {
        Kind::Bool => any::<bool>().prop_map(move |v| Literal::bool(n, v)).boxed(),
        Kind::I8 => any::<i8>().prop_map(move |v| Literal::i8(n, v)).boxed(),
        Kind::I16 => any::<i16>().prop_map(move |v| Literal::i16(n, v)).boxed(),
        Kind::I32 => any::<i32>().prop_map(move |v| Literal::i32(n, v)).boxed(),
        Kind::I64 => any::<i64>().prop_map(move |v| Literal::i64(n, v)).boxed(),
        Kind::Fp32 => match floats {
            Floats::Any => prop_oneof![any::<f32>(), Just(-0.0f32), Just(f32::NAN)].boxed(),
            Floats::Finite => (-1.0e30f32..1.0e30f32).boxed(),
        }
        .prop_map(move |v| Literal::fp32(n, v))
        .boxed(),
        Kind::Fp64 => match floats {
            Floats::Any => prop_oneof![any::<f64>(), Just(-0.0f64), Just(f64::NAN)].boxed(),
            Floats::Finite => (-1.0e300f64..1.0e300f64).boxed(),
        }
        .prop_map(move |v| Literal::fp64(n, v))
        .boxed(),
        Kind::String => arb_chars(0, 16)
            .prop_map(move |v| Literal::string(n, v))
            .boxed(),
        Kind::Binary => prop::collection::vec(any::<u8>(), 0..32)
            .prop_map(move |v| Literal::binary(n, v))
            .boxed(),
        Kind::FixedChar { length } => arb_chars(length as usize, length as usize)
            .prop_map(move |v| Literal::fixed_char(n, v).expect("fixed char"))
            .boxed(),
        Kind::VarChar { length } => arb_chars(0, length as usize)
            .prop_map(move |v| Literal::var_char(n, v, length).expect("var char"))
            .boxed(),
        Kind::FixedBinary { length } => prop::collection::vec(any::<u8>(), length as usize)
            .prop_map(move |v| Literal::fixed_binary(n, v).expect("fixed binary"))
            .boxed(),
        Kind::Decimal { precision, scale } => {
            let max = max_unscaled(precision);
            (-max..=max)
                .prop_map(move |v| {
                    Literal::decimal(n, Decimal::new(v, precision, scale).expect("in range"))
                })
                .boxed()
        }
        Kind::Date => any::<i32>()
            .prop_map(move |d| Literal::date(n, Date::from_epoch_day(d)))
            .boxed(),
        Kind::Time => (0..MICROS_PER_DAY)
            .prop_map(move |us| Literal::time(n, TimeOfDay::from_micros(us).expect("in day")))
            .boxed(),
        Kind::Timestamp => any::<i64>()
            .prop_map(move |us| Literal::timestamp(n, Timestamp::from_micros(us)))
            .boxed(),
        Kind::TimestampTz => any::<i64>()
            .prop_map(move |us| Literal::timestamp_tz(n, Timestamp::from_micros(us)))
            .boxed(),
        Kind::IntervalYear => (-1_000_000i64..1_000_000)
            .prop_map(move |m| {
                Literal::interval_year(n, IntervalYearMonth::from_total_months(m).expect("fits"))
            })
            .boxed(),
        Kind::IntervalDay => (-1_000_000_000_000_000i64..1_000_000_000_000_000, 1u8..=9)
            .prop_map(move |(us, precision)| {
                let interval = IntervalDayTime::from_total_micros(us, precision).expect("fits");
                Literal::interval_day(n, interval)
            })
            .boxed(),
        Kind::List { element } => {
            let element = *element;
            prop::collection::vec(arb_literal_with(&element, floats), 0..4)
                .prop_map(move |items| {
                    Literal::list_of(n, element.clone(), items).expect("consistent list")
                })
                .boxed()
        }
        Kind::Map { key, value } => {
            let (key, value) = (*key, *value);
            prop::collection::vec(
                (arb_literal_with(&key, floats), arb_literal_with(&value, floats)),
                0..4,
            )
            .prop_map(move |entries| {
                Literal::map_of(n, key.clone(), value.clone(), entries).expect("consistent map")
            })
            .boxed()
        }
        Kind::Struct { fields } => {
            let field_gens: Vec<BoxedStrategy<Literal>> =
                fields.iter().map(|f| arb_literal_with(f, floats)).collect();
            field_gens
                .prop_map(move |values| Literal::struct_(n, values))
                .boxed()
        }
    }
}

/// Generate a compatible Literal for a given Type, including typed nulls
pub fn arb_literal_for_type(ty: &Type) -> BoxedStrategy<Literal> {
    arb_literal_with(ty, Floats::Any)
}

pub fn arb_literal_with(ty: &Type, floats: Floats) -> BoxedStrategy<Literal> {
    let value = arb_value_for_type(ty, floats);
    if ty.is_nullable() {
        let null = Literal::typed_null(ty.clone()).expect("nullable type");
        prop_oneof![1 => Just(null), 4 => value].boxed()
    } else {
        value
    }
}

/// Generate a Type together with a Literal of that type
pub fn arb_type_and_literal() -> impl Strategy<Value = (Type, Literal)> {
    arb_type().prop_flat_map(|ty| {
        let literal = arb_literal_for_type(&ty);
        (Just(ty), literal)
    })
}

/// Generate an arbitrary valid Literal
pub fn arb_literal() -> impl Strategy<Value = Literal> {
    arb_type_and_literal().prop_map(|(_, literal)| literal)
}

/// Generate a Literal that JSON can carry exactly
pub fn arb_json_literal() -> impl Strategy<Value = Literal> {
    arb_type().prop_flat_map(|ty| arb_literal_with(&ty, Floats::Finite))
}

/// Generate values sitting on decimal range boundaries
pub fn arb_decimal_boundary() -> impl Strategy<Value = Decimal> {
    arb_decimal_parameters().prop_flat_map(|(precision, scale)| {
        let max = max_unscaled(precision);
        let edge = max / 10 + 1; // 10^(p-1)
        prop_oneof![
            Just(0i128),
            Just(max),
            Just(-max),
            Just(edge),
            Just(-edge),
        ]
        .prop_map(move |v| Decimal::new(v, precision, scale).expect("boundary in range"))
    })
}
