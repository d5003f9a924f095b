//! Fixed PostgreSQL type OID -> canonical type name table
//!
//! Used for result fields and prepared-statement parameters, where the
//! driver reports a type OID instead of a catalog name.

/// Canonical native type recovered from an OID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OidType {
    /// Element type name for arrays
    pub name: &'static str,
    pub is_array: bool,
}

const fn scalar(name: &'static str) -> Option<OidType> {
    Some(OidType {
        name,
        is_array: false,
    })
}

const fn array(name: &'static str) -> Option<OidType> {
    Some(OidType {
        name,
        is_array: true,
    })
}

/// Look up a built-in type OID
pub fn canonical_type_for_oid(oid: u32) -> Option<OidType> {
    match oid {
        16 => scalar("bool"),
        17 => scalar("bytea"),
        18 => scalar("\"char\""),
        19 => scalar("name"),
        20 => scalar("int8"),
        21 => scalar("int2"),
        23 => scalar("int4"),
        25 => scalar("text"),
        26 => scalar("oid"),
        114 => scalar("json"),
        650 => scalar("cidr"),
        700 => scalar("float4"),
        701 => scalar("float8"),
        790 => scalar("money"),
        869 => scalar("inet"),
        1042 => scalar("bpchar"),
        1043 => scalar("varchar"),
        1082 => scalar("date"),
        1083 => scalar("time"),
        1114 => scalar("timestamp"),
        1184 => scalar("timestamptz"),
        1186 => scalar("interval"),
        1266 => scalar("timetz"),
        1700 => scalar("numeric"),
        2950 => scalar("uuid"),
        3802 => scalar("jsonb"),

        199 => array("json"),
        651 => array("cidr"),
        1000 => array("bool"),
        1001 => array("bytea"),
        1003 => array("name"),
        1005 => array("int2"),
        1007 => array("int4"),
        1009 => array("text"),
        1014 => array("bpchar"),
        1015 => array("varchar"),
        1016 => array("int8"),
        1021 => array("float4"),
        1022 => array("float8"),
        1028 => array("oid"),
        1041 => array("inet"),
        1115 => array("timestamp"),
        1182 => array("date"),
        1183 => array("time"),
        1185 => array("timestamptz"),
        1187 => array("interval"),
        1231 => array("numeric"),
        1270 => array("timetz"),
        2951 => array("uuid"),
        3807 => array("jsonb"),
        _ => None,
    }
}

/// Native type name plus array flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    pub name: String,
    pub is_array: bool,
}

/// OID lookup with driver-name fallback
pub fn native_type(oid: u32, driver_name: &str) -> NativeType {
    match canonical_type_for_oid(oid) {
        Some(t) => NativeType {
            name: t.name.to_string(),
            is_array: t.is_array,
        },
        None => fallback_native_type(driver_name),
    }
}

/// Fallback for OIDs outside the fixed table: use the name the driver
/// reported (enums, domains, extension types). Array names arrive either as
/// `_elem` or `ELEM[]`.
fn fallback_native_type(type_name: &str) -> NativeType {
    let lowered = type_name.trim().to_lowercase();
    if let Some(element) = lowered.strip_suffix("[]") {
        return NativeType {
            name: element.to_string(),
            is_array: true,
        };
    }
    if let Some(element) = lowered.strip_prefix('_') {
        return NativeType {
            name: element.to_string(),
            is_array: true,
        };
    }
    NativeType {
        name: lowered,
        is_array: false,
    }
}
