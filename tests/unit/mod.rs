/// Unit tests exercising the public library API
mod basic_tests;
