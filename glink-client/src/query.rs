/// Query operations on a transaction
///
/// Match, insert and update answers are streamed: they are returned as an
/// [`AnswerStream`] that pulls further pages from the server as it is
/// iterated. Aggregates, deletes and schema changes have a single response.
use glink_core::{CallOptions, Error, ResultIterator};
use glink_proto::query::{self, req, res, res_part};
use glink_proto::transaction::req::Req as TransactionReq;

use crate::answer::{ConceptMap, Numeric};
use crate::convert;
use crate::error::{ClientError, Result};
use crate::message::{TransactionRequest, TransactionResponse};
use crate::options::Options;
use crate::transaction::Transaction;

/// Streamed answers of a query.
pub struct AnswerStream<T> {
    inner: ResultIterator<TransactionRequest, TransactionResponse, T>,
}

impl<T> AnswerStream<T> {
    /// Stop consuming answers. The server keeps the remaining answers until
    /// the transaction ends.
    pub fn close(&mut self) {
        self.inner.close();
    }
}

impl<T> Iterator for AnswerStream<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|item| item.map_err(ClientError::from))
    }
}

fn unexpected(expected: &str, got: &TransactionResponse) -> Error {
    Error::UnexpectedResponse(format!("expected {}, got {} response", expected, got.kind()))
}

fn decode_concept_maps(response: TransactionResponse) -> glink_core::Result<Vec<ConceptMap>> {
    match response {
        TransactionResponse::QueryPart(query::ResPart {
            res: Some(part),
        }) => match part {
            res_part::Res::MatchResPart(part) => convert::concept_maps(part.answers),
            res_part::Res::InsertResPart(part) => convert::concept_maps(part.answers),
            res_part::Res::UpdateResPart(part) => convert::concept_maps(part.answers),
        },
        other => Err(unexpected("query answers", &other)),
    }
}

/// Query entry points of one transaction.
pub struct QueryManager<'a> {
    transaction: &'a Transaction,
}

impl<'a> QueryManager<'a> {
    pub(crate) fn new(transaction: &'a Transaction) -> Self {
        Self { transaction }
    }

    fn request(query: req::Req, options: &Options) -> TransactionRequest {
        TransactionReq::QueryManagerReq(query::Req {
            options: Some(options.to_proto()),
            req: Some(query),
        })
    }

    fn call_options(&self) -> CallOptions {
        self.transaction.call_options()
    }

    fn stream(&self, query: req::Req, options: &Options) -> Result<AnswerStream<ConceptMap>> {
        let inner = self.transaction.stream().execute_streaming_with(
            Self::request(query, options),
            self.call_options(),
            decode_concept_maps,
        )?;
        Ok(AnswerStream { inner })
    }

    fn single(&self, query: req::Req, options: &Options) -> Result<query::Res> {
        let response = self
            .transaction
            .stream()
            .execute_unary_with(Self::request(query, options), self.call_options())?;
        match response {
            TransactionResponse::Query(res) => Ok(res),
            other => Err(unexpected("query result", &other).into()),
        }
    }

    fn empty(&self, query: req::Req, options: &Options) -> Result<()> {
        match self.single(query, options)?.res {
            Some(res::Res::DeleteRes(_)) | Some(res::Res::DefineRes(_)) | Some(res::Res::UndefineRes(_)) => Ok(()),
            Some(res::Res::MatchAggregateRes(_)) => Err(Error::UnexpectedResponse(
                "aggregate result for a statement without answers".to_string(),
            )
            .into()),
            None => Err(Error::MissingResponseField("query.res".to_string()).into()),
        }
    }

    /// Stream the answers of a match query.
    pub fn r#match(&self, query: &str) -> Result<AnswerStream<ConceptMap>> {
        self.match_with_options(query, &Options::default())
    }

    pub fn match_with_options(&self, query: &str, options: &Options) -> Result<AnswerStream<ConceptMap>> {
        self.stream(
            req::Req::MatchReq(query::r#match::Req {
                query: query.to_string(),
            }),
            options,
        )
    }

    /// Run a match query ending in an aggregate such as `count` or `mean`.
    pub fn match_aggregate(&self, query: &str) -> Result<Numeric> {
        self.match_aggregate_with_options(query, &Options::default())
    }

    pub fn match_aggregate_with_options(&self, query: &str, options: &Options) -> Result<Numeric> {
        let request = req::Req::MatchAggregateReq(query::match_aggregate::Req {
            query: query.to_string(),
        });
        match self.single(request, options)?.res {
            Some(res::Res::MatchAggregateRes(aggregate)) => Ok(convert::numeric(aggregate.answer)?),
            Some(_) => Err(Error::UnexpectedResponse("expected an aggregate result".to_string()).into()),
            None => Err(Error::MissingResponseField("query.res".to_string()).into()),
        }
    }

    /// Stream the concepts inserted by an insert query.
    pub fn insert(&self, query: &str) -> Result<AnswerStream<ConceptMap>> {
        self.insert_with_options(query, &Options::default())
    }

    pub fn insert_with_options(&self, query: &str, options: &Options) -> Result<AnswerStream<ConceptMap>> {
        self.stream(
            req::Req::InsertReq(query::insert::Req {
                query: query.to_string(),
            }),
            options,
        )
    }

    /// Stream the answers of an update query.
    pub fn update(&self, query: &str) -> Result<AnswerStream<ConceptMap>> {
        self.update_with_options(query, &Options::default())
    }

    pub fn update_with_options(&self, query: &str, options: &Options) -> Result<AnswerStream<ConceptMap>> {
        self.stream(
            req::Req::UpdateReq(query::update::Req {
                query: query.to_string(),
            }),
            options,
        )
    }

    pub fn delete(&self, query: &str) -> Result<()> {
        self.delete_with_options(query, &Options::default())
    }

    pub fn delete_with_options(&self, query: &str, options: &Options) -> Result<()> {
        self.empty(
            req::Req::DeleteReq(query::delete::Req {
                query: query.to_string(),
            }),
            options,
        )
    }

    /// Add types and rules to the schema. Requires a schema session.
    pub fn define(&self, query: &str) -> Result<()> {
        self.define_with_options(query, &Options::default())
    }

    pub fn define_with_options(&self, query: &str, options: &Options) -> Result<()> {
        self.empty(
            req::Req::DefineReq(query::define::Req {
                query: query.to_string(),
            }),
            options,
        )
    }

    /// Remove types and rules from the schema. Requires a schema session.
    pub fn undefine(&self, query: &str) -> Result<()> {
        self.undefine_with_options(query, &Options::default())
    }

    pub fn undefine_with_options(&self, query: &str, options: &Options) -> Result<()> {
        self.empty(
            req::Req::UndefineReq(query::undefine::Req {
                query: query.to_string(),
            }),
            options,
        )
    }
}
