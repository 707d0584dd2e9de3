/// Query and transaction options. Every field is optional; unset fields take
/// the server default.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Options {
    #[prost(bool, optional, tag = "1")]
    pub infer: ::core::option::Option<bool>,
    #[prost(bool, optional, tag = "2")]
    pub explain: ::core::option::Option<bool>,
    #[prost(bool, optional, tag = "3")]
    pub parallel: ::core::option::Option<bool>,
    #[prost(bool, optional, tag = "4")]
    pub prefetch: ::core::option::Option<bool>,
    #[prost(int32, optional, tag = "5")]
    pub prefetch_size: ::core::option::Option<i32>,
    #[prost(int32, optional, tag = "6")]
    pub session_idle_timeout_millis: ::core::option::Option<i32>,
    #[prost(int32, optional, tag = "7")]
    pub transaction_timeout_millis: ::core::option::Option<i32>,
    #[prost(int32, optional, tag = "8")]
    pub schema_lock_acquire_timeout_millis: ::core::option::Option<i32>,
}
