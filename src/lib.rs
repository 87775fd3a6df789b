#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vc_serial as serial;

/// The items most programs need.
pub mod prelude {
    pub use vc_serial::node::{DataNode, MappingNode, SequenceNode};
    pub use vc_serial::result::ResultNode;
    pub use vc_serial::schema::InheritancePolicy;
    pub use vc_serial::validation::ValidationNode;
    pub use vc_serial::{
        DataDefinition, DataType, SerializationConfig, SerializationContext, SerializationManager,
    };
}
