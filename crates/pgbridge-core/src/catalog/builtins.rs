//! Well-known catalog types.
//!
//! Introspection normally supplies these, but hosts and tests that build a
//! catalog by hand can start from [`builtin_types`].

use super::{category, Oid, TypeDescriptor};

/// Ids of well-known catalog types.
pub mod oids {
    use super::Oid;

    pub const BOOL: Oid = Oid(16);
    pub const BYTEA: Oid = Oid(17);
    pub const CHAR: Oid = Oid(18);
    pub const NAME: Oid = Oid(19);
    pub const INT8: Oid = Oid(20);
    pub const INT2: Oid = Oid(21);
    pub const INT4: Oid = Oid(23);
    pub const TEXT: Oid = Oid(25);
    pub const JSON: Oid = Oid(114);
    pub const XML: Oid = Oid(142);
    pub const POINT: Oid = Oid(600);
    pub const CIDR: Oid = Oid(650);
    pub const FLOAT4: Oid = Oid(700);
    pub const FLOAT8: Oid = Oid(701);
    pub const MONEY: Oid = Oid(790);
    pub const MACADDR: Oid = Oid(829);
    pub const INET: Oid = Oid(869);
    pub const BPCHAR: Oid = Oid(1042);
    pub const VARCHAR: Oid = Oid(1043);
    pub const DATE: Oid = Oid(1082);
    pub const TIME: Oid = Oid(1083);
    pub const TIMESTAMP: Oid = Oid(1114);
    pub const TIMESTAMPTZ: Oid = Oid(1184);
    pub const INTERVAL: Oid = Oid(1186);
    pub const TIMETZ: Oid = Oid(1266);
    pub const BIT: Oid = Oid(1560);
    pub const VARBIT: Oid = Oid(1562);
    pub const NUMERIC: Oid = Oid(1700);
    pub const UUID: Oid = Oid(2950);
    pub const JSONB: Oid = Oid(3802);

    pub const INT4RANGE: Oid = Oid(3904);
    pub const NUMRANGE: Oid = Oid(3906);
    pub const TSRANGE: Oid = Oid(3908);
    pub const TSTZRANGE: Oid = Oid(3910);
    pub const DATERANGE: Oid = Oid(3912);
    pub const INT8RANGE: Oid = Oid(3926);

    pub const BOOL_ARRAY: Oid = Oid(1000);
    pub const INT2_ARRAY: Oid = Oid(1005);
    pub const INT4_ARRAY: Oid = Oid(1007);
    pub const TEXT_ARRAY: Oid = Oid(1009);
    pub const VARCHAR_ARRAY: Oid = Oid(1015);
    pub const INT8_ARRAY: Oid = Oid(1016);
    pub const POINT_ARRAY: Oid = Oid(1017);
    pub const FLOAT8_ARRAY: Oid = Oid(1022);
    pub const DATE_ARRAY: Oid = Oid(1182);
    pub const TIMESTAMPTZ_ARRAY: Oid = Oid(1185);
    pub const INTERVAL_ARRAY: Oid = Oid(1187);
    pub const NUMERIC_ARRAY: Oid = Oid(1231);
    pub const UUID_ARRAY: Oid = Oid(2951);
    pub const JSONB_ARRAY: Oid = Oid(3807);
}

/// Descriptors for the well-known `pg_catalog` types in [`oids`].
pub fn builtin_types() -> Vec<TypeDescriptor> {
    use oids::*;

    let base = |id, name: &str, cat| TypeDescriptor::base(id, "pg_catalog", name, cat);
    let array = |id, name: &str, item| TypeDescriptor::array(id, "pg_catalog", name, item);
    let range = |id, name: &str, sub| TypeDescriptor::range(id, "pg_catalog", name, sub);

    vec![
        base(BOOL, "bool", category::BOOLEAN),
        base(BYTEA, "bytea", category::USER),
        base(CHAR, "char", category::STRING),
        base(NAME, "name", category::STRING),
        base(INT8, "int8", category::NUMERIC),
        base(INT2, "int2", category::NUMERIC),
        base(INT4, "int4", category::NUMERIC),
        base(TEXT, "text", category::STRING),
        base(JSON, "json", category::USER),
        base(XML, "xml", category::USER),
        base(POINT, "point", category::GEOMETRIC),
        base(CIDR, "cidr", category::NETWORK),
        base(FLOAT4, "float4", category::NUMERIC),
        base(FLOAT8, "float8", category::NUMERIC),
        base(MONEY, "money", category::NUMERIC),
        base(MACADDR, "macaddr", category::USER),
        base(INET, "inet", category::NETWORK),
        base(BPCHAR, "bpchar", category::STRING),
        base(VARCHAR, "varchar", category::STRING),
        base(DATE, "date", category::DATETIME),
        base(TIME, "time", category::DATETIME),
        base(TIMESTAMP, "timestamp", category::DATETIME),
        base(TIMESTAMPTZ, "timestamptz", category::DATETIME),
        base(INTERVAL, "interval", category::TIMESPAN),
        base(TIMETZ, "timetz", category::DATETIME),
        base(BIT, "bit", category::BITSTRING),
        base(VARBIT, "varbit", category::BITSTRING),
        base(NUMERIC, "numeric", category::NUMERIC),
        base(UUID, "uuid", category::USER),
        base(JSONB, "jsonb", category::USER),
        range(INT4RANGE, "int4range", INT4),
        range(NUMRANGE, "numrange", NUMERIC),
        range(TSRANGE, "tsrange", TIMESTAMP),
        range(TSTZRANGE, "tstzrange", TIMESTAMPTZ),
        range(DATERANGE, "daterange", DATE),
        range(INT8RANGE, "int8range", INT8),
        array(BOOL_ARRAY, "_bool", BOOL),
        array(INT2_ARRAY, "_int2", INT2),
        array(INT4_ARRAY, "_int4", INT4),
        array(TEXT_ARRAY, "_text", TEXT),
        array(VARCHAR_ARRAY, "_varchar", VARCHAR),
        array(INT8_ARRAY, "_int8", INT8),
        array(POINT_ARRAY, "_point", POINT),
        array(FLOAT8_ARRAY, "_float8", FLOAT8),
        array(DATE_ARRAY, "_date", DATE),
        array(TIMESTAMPTZ_ARRAY, "_timestamptz", TIMESTAMPTZ),
        array(INTERVAL_ARRAY, "_interval", INTERVAL),
        array(NUMERIC_ARRAY, "_numeric", NUMERIC),
        array(UUID_ARRAY, "_uuid", UUID),
        array(JSONB_ARRAY, "_jsonb", JSONB),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeCatalog;

    #[test]
    fn test_builtins_form_a_valid_catalog() {
        let catalog = TypeCatalog::from_descriptors(builtin_types()).unwrap();
        assert_eq!(catalog.get(oids::INT4).unwrap().name, "int4");
        for descriptor in catalog.iter() {
            for child in [
                descriptor.array_item_type,
                descriptor.range_sub_type,
                descriptor.domain_base_type,
            ]
            .into_iter()
            .flatten()
            {
                assert!(catalog.get(child).is_some(), "{} has a dangling child", descriptor.name);
            }
        }
    }
}
