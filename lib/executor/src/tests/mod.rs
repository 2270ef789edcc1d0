mod errors;
mod testkit;
mod transports;
