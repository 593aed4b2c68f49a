use proptest::prelude::*;
use strait_core::adapter::{round_trip, LiteralAdapter};
use strait_core::decimal::Decimal;
use strait_core::error::ErrorKind;
use strait_core::time::{Date, IntervalDayTime, IntervalYearMonth, TimeOfDay, Timestamp};
use strait_core::{Literal, Type};
use strait_sql::{IntervalQualifier, LowerContext, RelType, RexLiteral, RexValue, SqlAdapter, SqlType};

const NANOS_PER_MICRO: i64 = 1_000;
const MILLIS_PER_DAY: i64 = 86_400_000;

fn c(value: RexValue, sql: SqlType) -> RexLiteral {
    RexLiteral::new(value, RelType::not_null(sql))
}

fn lift(rex: &RexLiteral) -> Literal {
    SqlAdapter.lift(rex).expect("lift failed")
}

fn lower(literal: &Literal) -> RexLiteral {
    SqlAdapter
        .lower(literal, &LowerContext::new())
        .expect("lower failed")
}

/// host -> literal equals `expected`, and literal -> host gives the host value back
fn bitest(expected: Literal, rex: RexLiteral) {
    bitest_in(expected, rex, LowerContext::new());
}

fn bitest_in(expected: Literal, rex: RexLiteral, context: LowerContext) {
    assert_eq!(lift(&rex), expected);
    let converted = SqlAdapter.lower(&expected, &context).expect("lower failed");
    assert_eq!(converted, rex);
}

fn micros_of(hour: i64, minute: i64, second: i64) -> i64 {
    (hour * 3_600 + minute * 60 + second) * 1_000_000
}

#[test]
fn null_literal() {
    bitest(
        Literal::typed_null(Type::var_char(10, true)).unwrap(),
        RexLiteral::null(SqlType::VarChar { length: Some(10) }),
    );
}

#[test]
fn integers_by_width() {
    bitest(Literal::i8(false, 4), RexLiteral::integer(4, SqlType::TinyInt));
    bitest(Literal::i16(false, 4), RexLiteral::integer(4, SqlType::SmallInt));
    bitest(Literal::i32(false, 4), RexLiteral::integer(4, SqlType::Integer));
    bitest(Literal::i64(false, 1234), RexLiteral::integer(1234, SqlType::BigInt));
}

#[test]
fn integer_outside_width_is_an_error() {
    let rex = RexLiteral::integer(i64::from(i32::MAX) + 1, SqlType::Integer);
    assert_eq!(
        SqlAdapter.lift(&rex).unwrap_err().kind(),
        ErrorKind::Unrepresentable
    );
}

#[test]
fn approximate_numerics() {
    bitest(
        Literal::fp32(false, 4.44),
        c(RexValue::Approx(f64::from(4.44f32)), SqlType::Real),
    );
    bitest(
        Literal::fp64(false, f64::from(4.45f32)),
        c(RexValue::Approx(f64::from(4.45f32)), SqlType::Double),
    );
}

#[test]
fn float_lifts_to_fp64() {
    let rex = c(RexValue::Approx(f64::from(4.45f32)), SqlType::Float);
    assert_eq!(lift(&rex), Literal::fp64(false, f64::from(4.45f32)));

    // without a hint the host gets DOUBLE; with one it gets FLOAT back
    assert_eq!(lower(&lift(&rex)).ty.sql, SqlType::Double);
    bitest_in(
        Literal::fp64(false, f64::from(4.45f32)),
        rex.clone(),
        LowerContext::with_target(rex.ty.clone()),
    );
}

#[test]
fn strings_and_bytes() {
    bitest(
        Literal::string(false, "my test"),
        c(RexValue::Char("my test".into()), SqlType::VarChar { length: None }),
    );
    bitest(
        Literal::binary(false, b"my test".to_vec()),
        c(RexValue::Binary(b"my test".to_vec()), SqlType::VarBinary),
    );
    bitest(
        Literal::fixed_char(false, "hello ").unwrap(),
        c(RexValue::Char("hello ".into()), SqlType::Char { length: 6 }),
    );
    bitest(
        Literal::var_char(false, "hello ", 10).unwrap(),
        c(
            RexValue::Char("hello ".into()),
            SqlType::VarChar { length: Some(10) },
        ),
    );
    bitest(
        Literal::fixed_binary(false, b"my test".to_vec()).unwrap(),
        c(RexValue::Binary(b"my test".to_vec()), SqlType::Binary { length: 7 }),
    );
}

#[test]
fn fixed_char_length_must_match() {
    let rex = c(RexValue::Char("hello".into()), SqlType::Char { length: 6 });
    assert_eq!(SqlAdapter.lift(&rex).unwrap_err().kind(), ErrorKind::TypeMismatch);
}

#[test]
fn time_of_day() {
    let micros = micros_of(14, 22, 47);
    bitest(
        Literal::time(false, TimeOfDay::from_micros(micros).unwrap()),
        c(
            RexValue::Time(micros * NANOS_PER_MICRO),
            SqlType::Time { precision: 6 },
        ),
    );

    let micros = micros_of(14, 22, 47) + 123_456;
    bitest(
        Literal::time(false, TimeOfDay::from_hms_micro(14, 22, 47, 123_456).unwrap()),
        c(
            RexValue::Time(micros * NANOS_PER_MICRO),
            SqlType::Time { precision: 6 },
        ),
    );
}

#[test]
fn time_nanos_truncate_to_micros() {
    let base = micros_of(14, 22, 47) * NANOS_PER_MICRO;
    let nanos = c(
        RexValue::Time(base + 123_456_789),
        SqlType::Time { precision: 9 },
    );
    let micros = c(
        RexValue::Time(base + 123_456_000),
        SqlType::Time { precision: 6 },
    );
    assert_eq!(lift(&nanos), lift(&micros));
}

#[test]
fn date() {
    bitest(
        Literal::date_ymd(false, 2002, 2, 14).unwrap(),
        c(RexValue::Date(11_732), SqlType::Date),
    );
    assert_eq!(Date::from_ymd(2002, 2, 14).unwrap().epoch_day(), 11_732);
}

#[test]
fn timestamp() {
    let seconds = 11_732 * 86_400 + micros_of(16, 20, 47) / 1_000_000;
    for micros in [123u32, 123_456] {
        bitest(
            Literal::timestamp_from_components(false, 2002, 2, 14, 16, 20, 47, micros).unwrap(),
            c(
                RexValue::Timestamp {
                    seconds,
                    nanos: micros * 1_000,
                },
                SqlType::Timestamp { precision: 6 },
            ),
        );
    }
}

#[test]
fn zoned_timestamp_has_no_host_literal() {
    let lit = Literal::timestamp_tz(false, Timestamp::from_micros(1_000_000));
    let err = SqlAdapter.lower(&lit, &LowerContext::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unrepresentable);
}

#[test]
fn interval_year_month() {
    bitest(
        Literal::interval_year(false, IntervalYearMonth::new(3, 5).unwrap()),
        c(
            RexValue::Interval(3 * 12 + 5),
            SqlType::Interval(IntervalQualifier::YearToMonth),
        ),
    );
    bitest(
        Literal::interval_year(false, IntervalYearMonth::new(123, 5).unwrap()),
        c(
            RexValue::Interval(123 * 12 + 5),
            SqlType::Interval(IntervalQualifier::YearToMonth),
        ),
    );
}

#[test]
fn interval_year_and_month_qualifiers() {
    let years = c(
        RexValue::Interval(123 * 12),
        SqlType::Interval(IntervalQualifier::Year),
    );
    let lit = lift(&years);
    assert_eq!(
        lit,
        Literal::interval_year(false, IntervalYearMonth::new(123, 0).unwrap())
    );
    // only the magnitude survives; the qualifier comes from the context
    assert_eq!(lower(&lit).value, years.value);

    let months = c(
        RexValue::Interval(123),
        SqlType::Interval(IntervalQualifier::Month),
    );
    let lit = lift(&months);
    assert_eq!(
        lit,
        Literal::interval_year(false, IntervalYearMonth::new(10, 3).unwrap())
    );
    assert_eq!(lower(&lit).value, months.value);
}

#[test]
fn interval_day_to_second_millis() {
    let millis = 3 * MILLIS_PER_DAY + (5 * 3_600 + 7 * 60 + 9) * 1_000 + 500;
    let rex = c(
        RexValue::Interval(millis),
        SqlType::Interval(IntervalQualifier::DayToSecond { precision: 3 }),
    );
    let expected = Literal::interval_day(
        false,
        IntervalDayTime::new(3, 5 * 3_600 + 7 * 60 + 9, 500_000, 6).unwrap(),
    );
    bitest_in(expected, rex.clone(), LowerContext::with_target(rex.ty.clone()));
}

#[test]
fn interval_day() {
    let rex = c(
        RexValue::Interval(5 * MILLIS_PER_DAY),
        SqlType::Interval(IntervalQualifier::Day),
    );
    let lit = lift(&rex);
    assert_eq!(
        lit,
        Literal::interval_day(false, IntervalDayTime::new(5, 0, 0, 6).unwrap())
    );
    assert_eq!(lower(&lit).value, rex.value);
}

#[test]
fn decimals() {
    for text in ["-123.457890", "123.457890", "123.450000", "-123.450000"] {
        let d = Decimal::parse(text, 32, 6).unwrap();
        bitest(
            Literal::decimal(false, d),
            c(
                RexValue::Exact {
                    unscaled: d.unscaled(),
                    scale: 6,
                },
                SqlType::Decimal {
                    precision: 32,
                    scale: 6,
                },
            ),
        );
    }
    for text in [
        "-99.123456789123456789123456789123456789",
        "99.123456789123456789123456789123456789",
    ] {
        let d = Decimal::parse(text, 38, 36).unwrap();
        bitest(
            Literal::decimal(false, d),
            c(
                RexValue::Exact {
                    unscaled: d.unscaled(),
                    scale: 36,
                },
                SqlType::Decimal {
                    precision: 38,
                    scale: 36,
                },
            ),
        );
    }
}

#[test]
fn decimal_host_scale_is_rescaled_exactly() {
    let sql = SqlType::Decimal {
        precision: 10,
        scale: 4,
    };
    let coarse = c(
        RexValue::Exact {
            unscaled: 1234,
            scale: 2,
        },
        sql.clone(),
    );
    assert_eq!(
        lift(&coarse),
        Literal::decimal(false, Decimal::new(123_400, 10, 4).unwrap())
    );

    let too_fine = c(
        RexValue::Exact {
            unscaled: 123_456,
            scale: 5,
        },
        sql,
    );
    assert_eq!(
        SqlAdapter.lift(&too_fine).unwrap_err().kind(),
        ErrorKind::Unrepresentable
    );
}

#[test]
fn map() {
    let entries = vec![
        (Literal::string(false, "foo"), Literal::i32(false, 4)),
        (Literal::string(false, "bar"), Literal::i32(false, -1)),
    ];
    let varchar = SqlType::VarChar { length: None };
    let rex = c(
        RexValue::Map(vec![
            (
                c(RexValue::Char("foo".into()), varchar.clone()),
                RexLiteral::integer(4, SqlType::Integer),
            ),
            (
                c(RexValue::Char("bar".into()), varchar.clone()),
                RexLiteral::integer(-1, SqlType::Integer),
            ),
        ]),
        SqlType::Map(
            Box::new(RelType::not_null(varchar)),
            Box::new(RelType::not_null(SqlType::Integer)),
        ),
    );
    bitest(Literal::map(false, entries).unwrap(), rex);
}

#[test]
fn list() {
    let rex = c(
        RexValue::Array(vec![
            RexLiteral::integer(4, SqlType::Integer),
            RexLiteral::integer(-1, SqlType::Integer),
        ]),
        SqlType::Array(Box::new(RelType::not_null(SqlType::Integer))),
    );
    bitest(
        Literal::list(false, vec![Literal::i32(false, 4), Literal::i32(false, -1)]).unwrap(),
        rex,
    );
}

#[test]
fn struct_keeps_order_and_takes_names_from_context() {
    let row_type = SqlType::Row(vec![
        ("c1".to_string(), RelType::not_null(SqlType::Integer)),
        ("c2".to_string(), RelType::not_null(SqlType::Integer)),
    ]);
    let rex = c(
        RexValue::Row(vec![
            RexLiteral::integer(4, SqlType::Integer),
            RexLiteral::integer(-1, SqlType::Integer),
        ]),
        row_type,
    );
    let expected = Literal::struct_(false, vec![Literal::i32(false, 4), Literal::i32(false, -1)]);
    assert_eq!(lift(&rex), expected);
    bitest_in(expected, rex.clone(), LowerContext::with_target(rex.ty.clone()));
}

#[test]
fn row_arity_mismatch_is_a_validation_error() {
    let rex = c(
        RexValue::Row(vec![RexLiteral::integer(4, SqlType::Integer)]),
        SqlType::Row(vec![
            ("a".to_string(), RelType::not_null(SqlType::Integer)),
            ("b".to_string(), RelType::not_null(SqlType::Integer)),
        ]),
    );
    assert_eq!(SqlAdapter.lift(&rex).unwrap_err().kind(), ErrorKind::Validation);
}

#[test]
fn nested_nulls_round_trip() {
    let element = Type::i32(true);
    let list = Literal::list_of(
        true,
        element.clone(),
        vec![Literal::i32(true, 1), Literal::typed_null(element).unwrap()],
    )
    .unwrap();
    let back = round_trip(&SqlAdapter, &list, &LowerContext::new()).unwrap();
    assert_eq!(back, list);
}

fn arb_scalar() -> impl Strategy<Value = Literal> {
    prop_oneof![
        any::<(bool, bool)>().prop_map(|(n, v)| Literal::bool(n, v)),
        any::<(bool, i8)>().prop_map(|(n, v)| Literal::i8(n, v)),
        any::<(bool, i16)>().prop_map(|(n, v)| Literal::i16(n, v)),
        any::<(bool, i32)>().prop_map(|(n, v)| Literal::i32(n, v)),
        any::<(bool, i64)>().prop_map(|(n, v)| Literal::i64(n, v)),
        (any::<bool>(), -1.0e30f32..1.0e30f32).prop_map(|(n, v)| Literal::fp32(n, v)),
        (any::<bool>(), -1.0e300f64..1.0e300f64).prop_map(|(n, v)| Literal::fp64(n, v)),
        (any::<bool>(), ".{0,12}").prop_map(|(n, v)| Literal::string(n, v)),
        (any::<bool>(), -1_000_000i32..1_000_000).prop_map(|(n, d)| {
            Literal::date(n, Date::from_epoch_day(d))
        }),
        (any::<bool>(), 0i64..86_400_000_000).prop_map(|(n, us)| {
            Literal::time(n, TimeOfDay::from_micros(us).unwrap())
        }),
        (any::<bool>(), -(1i64 << 52)..(1i64 << 52)).prop_map(|(n, us)| {
            Literal::timestamp(n, Timestamp::from_micros(us))
        }),
        (any::<bool>(), -100_000i64..100_000).prop_map(|(n, m)| {
            Literal::interval_year_from_months(n, m).unwrap()
        }),
        (any::<bool>(), -1_000_000_000i64..1_000_000_000).prop_map(|(n, ms)| {
            let interval = IntervalDayTime::from_total_micros(ms * 1_000, 6).unwrap();
            Literal::interval_day(n, interval)
        }),
        (any::<bool>(), 1u8..=38).prop_flat_map(|(n, p)| {
            let max = strait_core::decimal::max_unscaled(p);
            (Just(n), Just(p), 0..=p, -max..=max)
        })
        .prop_map(|(n, p, s, v)| Literal::decimal(n, Decimal::new(v, p, s).unwrap())),
    ]
}

proptest! {
    #[test]
    fn prop_scalar_round_trip(literal in arb_scalar()) {
        let back = round_trip(&SqlAdapter, &literal, &LowerContext::new()).unwrap();
        prop_assert_eq!(back, literal);
    }
}
