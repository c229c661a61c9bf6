// End-to-end tests against a real PostgreSQL database.
//
// One shared testcontainers PostgreSQL instance serves the whole suite; each
// test leases its own isolated, migrated database (test_db_<uuid>) through
// test-context, and the database is truncated and recycled afterwards.

mod test_calendar;
mod test_events_api;
