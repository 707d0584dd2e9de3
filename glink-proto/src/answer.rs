/// Query answer messages
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConceptMap {
    #[prost(map = "string, message", tag = "1")]
    pub map: ::std::collections::HashMap<::prost::alloc::string::String, crate::concept::Concept>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Numeric {
    #[prost(oneof = "numeric::Value", tags = "1, 2, 3")]
    pub value: ::core::option::Option<numeric::Value>,
}

pub mod numeric {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(int64, tag = "1")]
        LongValue(i64),
        #[prost(double, tag = "2")]
        DoubleValue(f64),
        #[prost(bool, tag = "3")]
        Nan(bool),
    }
}
