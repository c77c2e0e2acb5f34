mod test_departure_teardown;
