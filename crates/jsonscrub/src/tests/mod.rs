mod property_roundtrip;
