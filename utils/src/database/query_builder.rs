use std::sync::Arc;

use postgres_from_row::FromRow;
use postgres_types::{FromSql, ToSql};
use tokio_postgres::{Error, Row};

pub fn query<'a>(query: impl ToString) -> QueryBuilder<'a> {
	QueryBuilder::new(query)
}

/// Incrementally builds a SQL statement together with its positional
/// parameters. Every pushed bind becomes the next `$n` placeholder.
#[derive(Default)]
pub struct QueryBuilder<'a> {
	query: String,
	params: Vec<Box<dyn ToSql + Send + Sync + 'a>>,
}

impl<'args> QueryBuilder<'args> {
	pub fn new(query: impl ToString) -> Self {
		Self {
			query: query.to_string(),
			params: Vec::new(),
		}
	}

	/// Appends a `$n` placeholder and binds `param` to it.
	pub fn push_bind(&mut self, param: impl ToSql + Send + Sync + 'args) -> &mut Self {
		self.params.push(Box::new(param));
		self.query.push_str(&format!("${}", self.params.len()));
		self
	}

	/// Binds `param` to the next placeholder without touching the SQL text,
	/// for statements written with explicit `$n` markers.
	pub fn bind(&mut self, param: impl ToSql + Send + Sync + 'args) -> &mut Self {
		self.params.push(Box::new(param));
		self
	}

	pub fn push(&mut self, query: impl AsRef<str>) -> &mut Self {
		self.query.push_str(query.as_ref());
		self
	}

	pub fn separated(&mut self, sep: &'args str) -> Separated<'_, 'args> {
		Separated {
			sep,
			first: true,
			query_builder: self,
		}
	}

	/// Number of parameters bound so far.
	pub fn param_count(&self) -> usize {
		self.params.len()
	}

	pub fn build(&self) -> Query<'_, NoParse> {
		self.query_with()
	}

	pub fn build_query_as<T: FromRow>(&self) -> Query<'_, FromRowParse<T>> {
		self.query_with()
	}

	pub fn build_query_single_scalar<T: for<'a> FromSql<'a>>(&self) -> Query<'_, SingleScalarParse<T>> {
		self.query_with()
	}

	fn query_with<P: RowParse>(&self) -> Query<'_, P> {
		Query {
			query: &self.query,
			params: &self.params,
			_marker: std::marker::PhantomData,
		}
	}

	pub fn sql(&self) -> &str {
		self.query.as_str()
	}
}

pub trait RowParse {
	type Item;

	fn try_from_row(row: Row) -> Result<Self::Item, Error>;
}

pub struct NoParse;

pub struct FromRowParse<T>(std::marker::PhantomData<T>);

pub struct SingleScalarParse<T>(std::marker::PhantomData<T>);

impl RowParse for NoParse {
	type Item = Row;

	#[inline]
	fn try_from_row(row: Row) -> Result<Self::Item, Error> {
		Ok(row)
	}
}

impl<T: FromRow> RowParse for FromRowParse<T> {
	type Item = T;

	#[inline]
	fn try_from_row(row: Row) -> Result<Self::Item, Error> {
		T::try_from_row(&row)
	}
}

impl<T> RowParse for SingleScalarParse<T>
where
	T: for<'a> FromSql<'a>,
{
	type Item = T;

	#[inline]
	fn try_from_row(row: Row) -> Result<Self::Item, Error> {
		row.try_get(0)
	}
}

pub struct Query<'a, P: RowParse> {
	query: &'a str,
	params: &'a [Box<dyn ToSql + Send + Sync + 'a>],
	_marker: std::marker::PhantomData<P>,
}

fn params<'a>(params: &'a [Box<dyn ToSql + Send + Sync + 'a>]) -> Vec<&'a (dyn ToSql + Sync)> {
	params.iter().map(|param| param.as_ref() as _).collect()
}

/// Something a query can run on: a pool, a pooled client or a transaction.
pub trait ClientLike: Send + Sync {
	#[doc(hidden)]
	fn query_builder_client(
		&self,
	) -> impl std::future::Future<Output = Result<impl AsRef<tokio_postgres::Client> + '_, deadpool_postgres::PoolError>> + Send;
}

struct PooledClient(deadpool_postgres::Client);

impl AsRef<tokio_postgres::Client> for PooledClient {
	fn as_ref(&self) -> &tokio_postgres::Client {
		&self.0
	}
}

struct BorrowedClient<'a>(&'a tokio_postgres::Client);

impl AsRef<tokio_postgres::Client> for BorrowedClient<'_> {
	fn as_ref(&self) -> &tokio_postgres::Client {
		self.0
	}
}

impl ClientLike for deadpool_postgres::Pool {
	async fn query_builder_client(&self) -> Result<impl AsRef<tokio_postgres::Client> + '_, deadpool_postgres::PoolError> {
		Ok(PooledClient(self.get().await?))
	}
}

impl ClientLike for deadpool_postgres::Client {
	async fn query_builder_client(&self) -> Result<impl AsRef<tokio_postgres::Client> + '_, deadpool_postgres::PoolError> {
		Ok(BorrowedClient(self))
	}
}

impl ClientLike for deadpool_postgres::Transaction<'_> {
	async fn query_builder_client(&self) -> Result<impl AsRef<tokio_postgres::Client> + '_, deadpool_postgres::PoolError> {
		Ok(BorrowedClient(self.client()))
	}
}

impl<T: ClientLike + Sync + Send> ClientLike for Arc<T> {
	async fn query_builder_client(&self) -> Result<impl AsRef<tokio_postgres::Client> + '_, deadpool_postgres::PoolError> {
		self.as_ref().query_builder_client().await
	}
}

impl<T: ClientLike + Sync> ClientLike for &T {
	async fn query_builder_client(&self) -> Result<impl AsRef<tokio_postgres::Client> + '_, deadpool_postgres::PoolError> {
		(*self).query_builder_client().await
	}
}

impl<P: RowParse> Query<'_, P> {
	pub async fn execute(self, conn: impl ClientLike) -> Result<u64, deadpool_postgres::PoolError> {
		tracing::debug!(sql = self.query, params = self.params.len(), "execute");
		let client = conn.query_builder_client().await?;
		Ok(client.as_ref().execute(self.query, &params(self.params)).await?)
	}

	pub async fn fetch_all(self, conn: impl ClientLike) -> Result<Vec<P::Item>, deadpool_postgres::PoolError> {
		tracing::debug!(sql = self.query, params = self.params.len(), "fetch_all");
		let client = conn.query_builder_client().await?;
		Ok(client
			.as_ref()
			.query(self.query, &params(self.params))
			.await?
			.into_iter()
			.map(P::try_from_row)
			.collect::<Result<_, Error>>()?)
	}

	pub async fn fetch_one(self, conn: impl ClientLike) -> Result<P::Item, deadpool_postgres::PoolError> {
		tracing::debug!(sql = self.query, params = self.params.len(), "fetch_one");
		let client = conn.query_builder_client().await?;
		Ok(P::try_from_row(
			client.as_ref().query_one(self.query, &params(self.params)).await?,
		)?)
	}

	pub async fn fetch_optional(self, conn: impl ClientLike) -> Result<Option<P::Item>, deadpool_postgres::PoolError> {
		tracing::debug!(sql = self.query, params = self.params.len(), "fetch_optional");
		let client = conn.query_builder_client().await?;
		Ok(client
			.as_ref()
			.query_opt(self.query, &params(self.params))
			.await?
			.map(P::try_from_row)
			.transpose()?)
	}
}

pub struct Separated<'b, 'args> {
	sep: &'b str,
	first: bool,
	query_builder: &'b mut QueryBuilder<'args>,
}

impl<'args> Separated<'_, 'args> {
	fn separate(&mut self) {
		if self.first {
			self.first = false;
		} else {
			self.query_builder.push(self.sep);
		}
	}

	pub fn push_bind(&mut self, param: impl ToSql + Send + Sync + 'args) -> &mut Self {
		self.separate();
		self.query_builder.push_bind(param);
		self
	}

	pub fn push(&mut self, query: impl AsRef<str>) -> &mut Self {
		self.separate();
		self.query_builder.push(query);
		self
	}

	pub fn push_unseparated(&mut self, query: impl AsRef<str>) -> &mut Self {
		self.query_builder.push(query);
		self
	}

	pub fn push_bind_unseparated(&mut self, param: impl ToSql + Send + Sync + 'args) -> &mut Self {
		self.query_builder.push_bind(param);
		self
	}
}
