/// Wire codec for transaction streams
///
/// Outbound requests carry the protocol's request oneof as payload. Inbound
/// server messages are split into the routing envelope the multiplexer
/// needs and a [`TransactionResponse`] payload that is decoded further by
/// the caller waiting for it.
use glink_core::{Error, Request, RequestBody, RequestId, Response, ResponseBody, Result};
use glink_proto::transaction::{self, req, res, res_part, server, stream};

/// Payload of a transaction request.
pub type TransactionRequest = req::Req;

/// Payload of a transaction response.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionResponse {
    Open,
    Commit,
    Rollback,
    Query(glink_proto::query::Res),
    QueryPart(glink_proto::query::ResPart),
}

impl TransactionResponse {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            TransactionResponse::Open => "open",
            TransactionResponse::Commit => "commit",
            TransactionResponse::Rollback => "rollback",
            TransactionResponse::Query(_) => "query",
            TransactionResponse::QueryPart(_) => "query part",
        }
    }
}

pub(crate) fn encode_request(request: Request<TransactionRequest>) -> transaction::Req {
    let req = match request.body {
        RequestBody::Payload(payload) => payload,
        RequestBody::Continue => req::Req::StreamReq(stream::Req {}),
    };
    transaction::Req {
        req_id: request.id.to_vec(),
        metadata: request.metadata,
        req: Some(req),
    }
}

pub(crate) fn encode_frame(requests: Vec<Request<TransactionRequest>>) -> transaction::Client {
    transaction::Client {
        reqs: requests.into_iter().map(encode_request).collect(),
    }
}

fn server_error(error: transaction::Error) -> Error {
    Error::Server {
        code: error.code,
        message: error.message,
    }
}

pub(crate) fn decode_response(message: transaction::Server) -> Result<Response<TransactionResponse>> {
    match message.server {
        Some(server::Server::Res(res)) => {
            let id = RequestId::from_bytes(&res.req_id)?;
            let body = match res.res {
                Some(res::Res::OpenRes(_)) => ResponseBody::Ok(TransactionResponse::Open),
                Some(res::Res::CommitRes(_)) => ResponseBody::Ok(TransactionResponse::Commit),
                Some(res::Res::RollbackRes(_)) => ResponseBody::Ok(TransactionResponse::Rollback),
                Some(res::Res::QueryManagerRes(query)) => {
                    ResponseBody::Ok(TransactionResponse::Query(query))
                }
                Some(res::Res::Error(error)) => ResponseBody::Error(server_error(error)),
                None => return Err(Error::MissingResponseField("res".to_string())),
            };
            Ok(Response { id, body })
        }
        Some(server::Server::ResPart(part)) => {
            let id = RequestId::from_bytes(&part.req_id)?;
            let body = match part.res {
                Some(res_part::Res::StreamResPart(stream_part)) => {
                    match stream::State::try_from(stream_part.state) {
                        Ok(stream::State::Continue) => ResponseBody::StreamContinue,
                        Ok(stream::State::Done) => ResponseBody::StreamDone,
                        Err(_) => {
                            return Err(Error::UnexpectedResponse(format!(
                                "unknown stream state {}",
                                stream_part.state
                            )))
                        }
                    }
                }
                Some(res_part::Res::QueryManagerResPart(part)) => {
                    ResponseBody::Ok(TransactionResponse::QueryPart(part))
                }
                Some(res_part::Res::Error(error)) => ResponseBody::Error(server_error(error)),
                None => return Err(Error::MissingResponseField("res_part".to_string())),
            };
            Ok(Response { id, body })
        }
        None => Err(Error::MissingResponseField("server".to_string())),
    }
}
