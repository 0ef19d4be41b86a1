//! Common test fixtures and constants.

use snmp_query::{Oid, Results, oid, snmpwalk};

// =============================================================================
// Standard system MIB OIDs (1.3.6.1.2.1.1.*)
// =============================================================================

pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}
pub fn sys_object_id() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 2, 0)
}
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}
pub fn sys_contact() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)
}
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}
pub fn sys_location() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 6, 0)
}
pub fn sys_services() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 7, 0)
}

// =============================================================================
// Subtree roots (for walks)
// =============================================================================

/// System subtree root: 1.3.6.1.2.1.1
pub fn system_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1)
}

/// Interfaces subtree root: 1.3.6.1.2.1.2
pub fn interfaces_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2)
}

/// ifHCInOctets column: 1.3.6.1.2.1.31.1.1.1.6
pub fn if_hc_in_octets() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 6)
}

// =============================================================================
// Test OIDs
// =============================================================================

/// Nonexistent OID for testing NoSuchObject
pub fn nonexistent_oid() -> Oid {
    oid!(1, 3, 6, 1, 99, 99, 99, 0)
}

// =============================================================================
// Recorded device
// =============================================================================

/// Agent address used in test URIs.
pub const AGENT: &str = "192.0.2.10";

/// `snmpwalk -On -v2c -c public 192.0.2.10 .1.3.6.1.2.1` of a small switch.
pub const DEVICE_WALK: &str = r#".1.3.6.1.2.1.1.1.0 = STRING: "Cisco IOS Software, C2960 Software (C2960-LANBASEK9-M), Version 12.2(50)SE4
Technical Support: http://www.cisco.com/techsupport
Compiled Fri 26-Mar-10 09:14 by prod_rel_team"
.1.3.6.1.2.1.1.2.0 = OID: .1.3.6.1.4.1.9.1.1208
.1.3.6.1.2.1.1.3.0 = Timeticks: (1524867295) 176 days, 11:44:32.95
.1.3.6.1.2.1.1.4.0 = STRING: "noc@example.net"
.1.3.6.1.2.1.1.5.0 = STRING: "sw-access-01"
.1.3.6.1.2.1.1.6.0 = STRING: "rack 4, row B"
.1.3.6.1.2.1.1.7.0 = INTEGER: 2
.1.3.6.1.2.1.2.1.0 = INTEGER: 3
.1.3.6.1.2.1.2.2.1.1.1 = INTEGER: 1
.1.3.6.1.2.1.2.2.1.1.2 = INTEGER: 2
.1.3.6.1.2.1.2.2.1.1.3 = INTEGER: 3
.1.3.6.1.2.1.2.2.1.2.1 = STRING: "Vlan1"
.1.3.6.1.2.1.2.2.1.2.2 = STRING: "FastEthernet0/1"
.1.3.6.1.2.1.2.2.1.2.3 = STRING: "FastEthernet0/2"
.1.3.6.1.2.1.2.2.1.3.1 = INTEGER: propVirtual(53)
.1.3.6.1.2.1.2.2.1.3.2 = INTEGER: ethernetCsmacd(6)
.1.3.6.1.2.1.2.2.1.3.3 = INTEGER: ethernetCsmacd(6)
.1.3.6.1.2.1.2.2.1.5.1 = Gauge32: 1000000000
.1.3.6.1.2.1.2.2.1.5.2 = Gauge32: 100000000
.1.3.6.1.2.1.2.2.1.5.3 = Gauge32: 10000000
.1.3.6.1.2.1.2.2.1.6.1 = Hex-STRING: 00 1B 2B 6C 91 40
.1.3.6.1.2.1.2.2.1.6.2 = Hex-STRING: 00 1B 2B 6C 91 01
.1.3.6.1.2.1.2.2.1.6.3 = Hex-STRING: 00 1B 2B 6C 91 02
.1.3.6.1.2.1.2.2.1.10.1 = Counter32: 3929018211
.1.3.6.1.2.1.2.2.1.10.2 = Counter32: 0
.1.3.6.1.2.1.2.2.1.10.3 = Counter32: 1887211
.1.3.6.1.2.1.4.20.1.1.192.0.2.10 = IpAddress: 192.0.2.10
.1.3.6.1.2.1.31.1.1.1.6.1 = Counter64: 98124412993
.1.3.6.1.2.1.31.1.1.1.6.2 = Counter64: 0
.1.3.6.1.2.1.31.1.1.1.6.3 = Counter64: 18446744073709551615
"#;

/// Number of records in [`DEVICE_WALK`].
pub const DEVICE_WALK_LEN: usize = 30;

/// The recorded device as a result collection.
pub fn device_results() -> Results {
    snmpwalk::parse(DEVICE_WALK).expect("fixture parses")
}

/// Mock agent serving the recorded device.
#[cfg(feature = "testing")]
pub fn device_agent() -> snmp_query::MockEngine {
    snmp_query::MockEngine::from_results(&device_results())
}

/// `snmp://public@AGENT/` followed by `path`.
pub fn uri(path: &str) -> String {
    format!("snmp://public@{}/{}", AGENT, path)
}
