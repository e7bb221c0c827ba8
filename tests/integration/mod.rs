mod helpers;
mod test_package;
mod test_promote;
mod test_status;
