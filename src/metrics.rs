use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, register_counter, register_gauge};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("admission_requests_total", "Total number of admission checks").unwrap();
    pub static ref REQUEST_DENIED: Counter =
        register_counter!("admission_denied_total", "Requests rejected for exceeding the limit").unwrap();
    pub static ref CLIENTS_EVICTED: Counter =
        register_counter!("admission_evicted_total", "Idle clients removed by the sweep").unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("admission_tracked_clients", "Clients currently held in the registry").unwrap();
}
