/// Path parameters captured by the matched route, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RouteParams(pub Box<[(String, String)]>);

#[derive(Debug)]
pub(crate) struct RouteInfo {
	pub route: usize,
	pub middleware: Vec<usize>,
}
