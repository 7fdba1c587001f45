use super::types::RouteParams;

pub trait RequestExt {
	fn param(&self, key: &str) -> Option<&str>;

	fn data<T: Send + Sync + 'static>(&self) -> Option<&T>;
}

impl<I> RequestExt for hyper::Request<I> {
	fn param(&self, key: &str) -> Option<&str> {
		self.extensions()
			.get::<RouteParams>()?
			.0
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.as_str())
	}

	fn data<T: Send + Sync + 'static>(&self) -> Option<&T> {
		self.extensions().get::<T>()
	}
}
