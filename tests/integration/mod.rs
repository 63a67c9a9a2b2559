/// Integration tests driving the server end to end
mod basic_integration;
