//! Test doubles shared by the integration suite.
