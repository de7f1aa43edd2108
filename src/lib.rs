// ATAL gateway: room and material availability, bookings and works requests

pub mod atal;
pub mod availability;
pub mod booking;
pub mod config;
pub mod connector;
pub mod error;
pub mod facility_api;
pub mod handlers;
pub mod merge;
pub mod model;
pub mod resolver;
pub mod routes;
pub mod thematic;
pub mod work_request;

// Re-export key types for convenience
pub use atal::{Reservation, Resource, ResourceKind, Thematic};
pub use availability::{build_slots, AvailabilityCalculator};
pub use booking::{BookingParty, BookingWriter};
pub use config::{ConnectorConfig, SlotConfig};
pub use connector::Connector;
pub use error::{GatewayError, GatewayResult};
pub use facility_api::{AtalClient, FacilityApi};
pub use merge::merge;
pub use model::{AvailabilitySlot, BookingInterval, Granularity, MergedInterval};
pub use resolver::ResourceResolver;
pub use routes::{router, Route, ROUTES};
pub use thematic::{ThematicFilter, ThematicNormalizer};
pub use work_request::WorkRequestService;
