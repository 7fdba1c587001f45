use std::panic::Location;

use bytes::Bytes;

use super::RouteError;

pub trait ResultExt<T, E, E2>: Sized {
	/// Replaces the error with a route error built from `ctx`, keeping the
	/// original as its source.
	fn map_err_route<C, B: From<Bytes>>(self, ctx: C) -> Result<T, RouteError<E2, B>>
	where
		RouteError<E2, B>: From<C>,
		E2: From<E>;

	/// Replaces the error with a route error built from `ctx`, discarding
	/// the original.
	fn map_ignore_err_route<C, B: From<Bytes>>(self, ctx: C) -> Result<T, RouteError<E2, B>>
	where
		RouteError<E2, B>: From<C>;
}

impl<T, E, E2> ResultExt<T, E, E2> for Result<T, E> {
	#[track_caller]
	fn map_err_route<C, B: From<Bytes>>(self, ctx: C) -> Result<T, RouteError<E2, B>>
	where
		RouteError<E2, B>: From<C>,
		E2: From<E>,
	{
		let location = Location::caller();
		self.map_err(|err| RouteError::from(ctx).with_source(Some(err.into())).with_location(location))
	}

	#[track_caller]
	fn map_ignore_err_route<C, B: From<Bytes>>(self, ctx: C) -> Result<T, RouteError<E2, B>>
	where
		RouteError<E2, B>: From<C>,
	{
		let location = Location::caller();
		self.map_err(|_| RouteError::from(ctx).with_location(location))
	}
}

pub trait OptionExt<T, E>: Sized {
	fn map_err_route<C, B: From<Bytes>>(self, ctx: C) -> Result<T, RouteError<E, B>>
	where
		RouteError<E, B>: From<C>;
}

impl<T, E> OptionExt<T, E> for Option<T> {
	#[track_caller]
	fn map_err_route<C, B: From<Bytes>>(self, ctx: C) -> Result<T, RouteError<E, B>>
	where
		RouteError<E, B>: From<C>,
	{
		let location = Location::caller();
		self.ok_or_else(|| RouteError::from(ctx).with_location(location))
	}
}
