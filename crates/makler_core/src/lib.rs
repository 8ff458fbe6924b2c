//! Makler core: search URL codec, postal codes, link filters and the pure
//! admin state machine.
mod batch;
mod broker;
mod effect;
mod filter;
mod link;
mod msg;
mod postal;
mod search_url;
mod state;
mod update;
mod view_model;

pub use batch::{BatchOutcome, BatchUrlGenerator, GeneratedUrl};
pub use broker::{Broker, BrokerSnapshot, BrokerStore};
pub use effect::{Effect, ExportScope};
pub use filter::{group_by_broker, FilterError, FilterInput, FilterSpec};
pub use link::{LinkGroups, LinkRecord, SearchSummary, UNASSIGNED_GROUP};
pub use msg::{LinkAction, Msg};
pub use postal::{InvalidPostalCode, PostalCode, PostalCodeSet};
pub use search_url::{
    decode, encode, CodecError, DecodedSearch, FieldParse, LocationSegment, SearchSpec,
    SearchUrlCodec, DEFAULT_BASE_URL, DEFAULT_CATEGORY,
};
pub use state::{AdminState, ExportRecord, Severity, StatusLine};
pub use update::update;
pub use view_model::{AdminViewModel, BrokerRowView};
