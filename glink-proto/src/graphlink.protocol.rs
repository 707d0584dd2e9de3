// Service stubs for `graphlink.protocol.GraphLink`, in the shape tonic-build
// emits with the message packages mapped onto this crate's modules.

/// Generated client implementations.
pub mod graph_link_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct GraphLinkClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl GraphLinkClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }

    impl<T> GraphLinkClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        async fn ready(&mut self) -> Result<(), tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })
        }

        async fn unary<Req, Res>(
            &mut self,
            request: impl tonic::IntoRequest<Req>,
            path: &'static str,
        ) -> std::result::Result<tonic::Response<Res>, tonic::Status>
        where
            Req: prost::Message + Send + Sync + 'static,
            Res: prost::Message + Default + Send + Sync + 'static,
        {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(path);
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn databases_contains(
            &mut self,
            request: impl tonic::IntoRequest<crate::database::contains::Req>,
        ) -> std::result::Result<tonic::Response<crate::database::contains::Res>, tonic::Status> {
            self.unary(request, "/graphlink.protocol.GraphLink/databases_contains").await
        }

        pub async fn databases_create(
            &mut self,
            request: impl tonic::IntoRequest<crate::database::create::Req>,
        ) -> std::result::Result<tonic::Response<crate::database::create::Res>, tonic::Status> {
            self.unary(request, "/graphlink.protocol.GraphLink/databases_create").await
        }

        pub async fn databases_all(
            &mut self,
            request: impl tonic::IntoRequest<crate::database::all::Req>,
        ) -> std::result::Result<tonic::Response<crate::database::all::Res>, tonic::Status> {
            self.unary(request, "/graphlink.protocol.GraphLink/databases_all").await
        }

        pub async fn database_delete(
            &mut self,
            request: impl tonic::IntoRequest<crate::database::delete::Req>,
        ) -> std::result::Result<tonic::Response<crate::database::delete::Res>, tonic::Status> {
            self.unary(request, "/graphlink.protocol.GraphLink/database_delete").await
        }

        pub async fn session_open(
            &mut self,
            request: impl tonic::IntoRequest<crate::session::open::Req>,
        ) -> std::result::Result<tonic::Response<crate::session::open::Res>, tonic::Status> {
            self.unary(request, "/graphlink.protocol.GraphLink/session_open").await
        }

        pub async fn session_pulse(
            &mut self,
            request: impl tonic::IntoRequest<crate::session::pulse::Req>,
        ) -> std::result::Result<tonic::Response<crate::session::pulse::Res>, tonic::Status> {
            self.unary(request, "/graphlink.protocol.GraphLink/session_pulse").await
        }

        pub async fn session_close(
            &mut self,
            request: impl tonic::IntoRequest<crate::session::close::Req>,
        ) -> std::result::Result<tonic::Response<crate::session::close::Res>, tonic::Status> {
            self.unary(request, "/graphlink.protocol.GraphLink/session_close").await
        }

        /// Opens the bidirectional transaction stream.
        pub async fn transaction(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = crate::transaction::Client>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<crate::transaction::Server>>,
            tonic::Status,
        > {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/graphlink.protocol.GraphLink/transaction");
            self.inner
                .streaming(request.into_streaming_request(), path, codec)
                .await
        }
    }
}

/// Generated server implementations.
pub mod graph_link_server {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;

    /// Generated trait containing gRPC methods that should be implemented for use with GraphLinkServer.
    #[async_trait]
    pub trait GraphLink: Send + Sync + 'static {
        async fn databases_contains(
            &self,
            request: tonic::Request<crate::database::contains::Req>,
        ) -> std::result::Result<tonic::Response<crate::database::contains::Res>, tonic::Status>;

        async fn databases_create(
            &self,
            request: tonic::Request<crate::database::create::Req>,
        ) -> std::result::Result<tonic::Response<crate::database::create::Res>, tonic::Status>;

        async fn databases_all(
            &self,
            request: tonic::Request<crate::database::all::Req>,
        ) -> std::result::Result<tonic::Response<crate::database::all::Res>, tonic::Status>;

        async fn database_delete(
            &self,
            request: tonic::Request<crate::database::delete::Req>,
        ) -> std::result::Result<tonic::Response<crate::database::delete::Res>, tonic::Status>;

        async fn session_open(
            &self,
            request: tonic::Request<crate::session::open::Req>,
        ) -> std::result::Result<tonic::Response<crate::session::open::Res>, tonic::Status>;

        async fn session_pulse(
            &self,
            request: tonic::Request<crate::session::pulse::Req>,
        ) -> std::result::Result<tonic::Response<crate::session::pulse::Res>, tonic::Status>;

        async fn session_close(
            &self,
            request: tonic::Request<crate::session::close::Req>,
        ) -> std::result::Result<tonic::Response<crate::session::close::Res>, tonic::Status>;

        /// Server streaming response type for the transaction method.
        type TransactionStream: tokio_stream::Stream<
                Item = std::result::Result<crate::transaction::Server, tonic::Status>,
            > + Send
            + 'static;

        /// One call per transaction. Requests and responses are matched by req_id.
        async fn transaction(
            &self,
            request: tonic::Request<tonic::Streaming<crate::transaction::Client>>,
        ) -> std::result::Result<tonic::Response<Self::TransactionStream>, tonic::Status>;
    }

    #[derive(Debug)]
    pub struct GraphLinkServer<T: GraphLink> {
        inner: _Inner<T>,
        accept_compression_encodings: EnabledCompressionEncodings,
        send_compression_encodings: EnabledCompressionEncodings,
    }

    struct _Inner<T>(Arc<T>);

    impl<T: GraphLink> GraphLinkServer<T> {
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }

        pub fn from_arc(inner: Arc<T>) -> Self {
            let inner = _Inner(inner);
            Self {
                inner,
                accept_compression_encodings: Default::default(),
                send_compression_encodings: Default::default(),
            }
        }

        pub fn with_interceptor<F>(inner: T, interceptor: F) -> InterceptedService<Self, F>
        where
            F: tonic::service::Interceptor,
        {
            InterceptedService::new(Self::new(inner), interceptor)
        }

        /// Enable decompressing requests with the given encoding.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.accept_compression_encodings.enable(encoding);
            self
        }

        /// Compress responses with the given encoding, if the client supports it.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.send_compression_encodings.enable(encoding);
            self
        }
    }

    macro_rules! unary_route {
        (
            $inner:ident, $accept:ident, $send:ident, $req:ident,
            $svc:ident, $method:ident, $request:ty, $response:ty
        ) => {{
            #[allow(non_camel_case_types)]
            struct $svc<T: GraphLink>(pub Arc<T>);
            impl<T: GraphLink> tonic::server::UnaryService<$request> for $svc<T> {
                type Response = $response;
                type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                fn call(&mut self, request: tonic::Request<$request>) -> Self::Future {
                    let inner = Arc::clone(&self.0);
                    let fut = async move { <T as GraphLink>::$method(&inner, request).await };
                    Box::pin(fut)
                }
            }
            let fut = async move {
                let method = $svc($inner.0);
                let codec = tonic::codec::ProstCodec::default();
                let mut grpc =
                    tonic::server::Grpc::new(codec).apply_compression_config($accept, $send);
                let res = grpc.unary(method, $req).await;
                Ok(res)
            };
            Box::pin(fut)
        }};
    }

    impl<T, B> tonic::codegen::Service<http::Request<B>> for GraphLinkServer<T>
    where
        T: GraphLink,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            let accept = self.accept_compression_encodings;
            let send = self.send_compression_encodings;
            match req.uri().path() {
                "/graphlink.protocol.GraphLink/databases_contains" => unary_route!(
                    inner, accept, send, req,
                    databases_containsSvc, databases_contains,
                    crate::database::contains::Req, crate::database::contains::Res
                ),
                "/graphlink.protocol.GraphLink/databases_create" => unary_route!(
                    inner, accept, send, req,
                    databases_createSvc, databases_create,
                    crate::database::create::Req, crate::database::create::Res
                ),
                "/graphlink.protocol.GraphLink/databases_all" => unary_route!(
                    inner, accept, send, req,
                    databases_allSvc, databases_all,
                    crate::database::all::Req, crate::database::all::Res
                ),
                "/graphlink.protocol.GraphLink/database_delete" => unary_route!(
                    inner, accept, send, req,
                    database_deleteSvc, database_delete,
                    crate::database::delete::Req, crate::database::delete::Res
                ),
                "/graphlink.protocol.GraphLink/session_open" => unary_route!(
                    inner, accept, send, req,
                    session_openSvc, session_open,
                    crate::session::open::Req, crate::session::open::Res
                ),
                "/graphlink.protocol.GraphLink/session_pulse" => unary_route!(
                    inner, accept, send, req,
                    session_pulseSvc, session_pulse,
                    crate::session::pulse::Req, crate::session::pulse::Res
                ),
                "/graphlink.protocol.GraphLink/session_close" => unary_route!(
                    inner, accept, send, req,
                    session_closeSvc, session_close,
                    crate::session::close::Req, crate::session::close::Res
                ),
                "/graphlink.protocol.GraphLink/transaction" => {
                    #[allow(non_camel_case_types)]
                    struct transactionSvc<T: GraphLink>(pub Arc<T>);
                    impl<T: GraphLink> tonic::server::StreamingService<crate::transaction::Client>
                        for transactionSvc<T>
                    {
                        type Response = crate::transaction::Server;
                        type ResponseStream = T::TransactionStream;
                        type Future = BoxFuture<tonic::Response<Self::ResponseStream>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<tonic::Streaming<crate::transaction::Client>>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move { <T as GraphLink>::transaction(&inner, request).await };
                            Box::pin(fut)
                        }
                    }
                    let fut = async move {
                        let method = transactionSvc(inner.0);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc =
                            tonic::server::Grpc::new(codec).apply_compression_config(accept, send);
                        let res = grpc.streaming(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    // Unimplemented
                    let mut response = http::Response::new(empty_body());
                    let headers = response.headers_mut();
                    headers.insert("grpc-status", http::HeaderValue::from_static("12"));
                    headers.insert(
                        http::header::CONTENT_TYPE,
                        http::HeaderValue::from_static("application/grpc"),
                    );
                    Ok(response)
                }),
            }
        }
    }

    impl<T: GraphLink> Clone for GraphLinkServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self {
                inner,
                accept_compression_encodings: self.accept_compression_encodings,
                send_compression_encodings: self.send_compression_encodings,
            }
        }
    }

    impl<T: GraphLink> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(Arc::clone(&self.0))
        }
    }

    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }

    impl<T: GraphLink> tonic::server::NamedService for GraphLinkServer<T> {
        const NAME: &'static str = "graphlink.protocol.GraphLink";
    }
}
