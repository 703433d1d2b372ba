mod summary;

pub(crate) use summary::print_summary;
