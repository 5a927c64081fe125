//! Default catalog used when no stored inventory exists

use super::types::{Product, ProductName};

fn item(
    id: &str,
    names: &[(&str, &str)],
    category: &str,
    price: f64,
    stock: u32,
    max_stock: u32,
    shelf: &str,
) -> Product {
    let mut name = ProductName::default();
    for (language, text) in names {
        name = name.with_translation(*language, *text);
    }
    Product::new(id, name, price, stock)
        .with_category(category)
        .with_max_stock(max_stock)
        .with_shelf(shelf)
}

pub fn default_inventory() -> Vec<Product> {
    vec![
        item("1", &[("en", "Rice"), ("hi", "चावल"), ("te", "బియ్యం"), ("ta", "அரிசி")], "Grains", 50.0, 100, 200, "A1"),
        item("2", &[("en", "Sugar"), ("hi", "चीनी"), ("te", "చక్కెర"), ("ta", "சர்க்கரை")], "Essentials", 40.0, 50, 100, "B1"),
        item("3", &[("en", "Milk"), ("hi", "दूध"), ("te", "పాలు"), ("ta", "பால்")], "Dairy", 30.0, 20, 50, "Fridge"),
        item("4", &[("en", "Oil"), ("hi", "तेल"), ("te", "నూనె"), ("ta", "எண்ணெய்")], "Oil", 120.0, 30, 60, "C1"),
        item("5", &[("en", "Wheat Flour"), ("hi", "गेहूं का आटा"), ("te", "గోధుమ పిండి"), ("ta", "கோதுமை மாவு")], "Flour", 45.0, 40, 80, "A2"),
        item("6", &[("en", "Salt"), ("hi", "नमक"), ("te", "ఉప్పు"), ("ta", "உப்பு")], "Essentials", 20.0, 80, 150, "B2"),
        item("7", &[("en", "Turmeric"), ("hi", "हल्दी"), ("te", "పసుపు"), ("ta", "மஞ்சள்")], "Spices", 150.0, 30, 60, "S1"),
        item("8", &[("en", "Chilli Powder"), ("hi", "लाल मिर्च पाउडर"), ("te", "కారం పొడి"), ("ta", "மிளகாய் தூள்")], "Spices", 180.0, 25, 50, "S2"),
        item("9", &[("en", "Tea"), ("hi", "चाय"), ("te", "తేనీరు"), ("ta", "தேநீர்")], "Beverage", 250.0, 40, 100, "D1"),
        item("10", &[("en", "Coffee"), ("hi", "कॉफी"), ("te", "కాఫీ"), ("ta", "காபி")], "Beverage", 400.0, 20, 50, "D2"),
        item("11", &[("en", "Toor Dal"), ("hi", "अरहर दाल"), ("te", "కంది పప్పు"), ("ta", "துவரம் பருப்பு")], "Pulses", 130.0, 60, 120, "P1"),
        item("12", &[("en", "Moong Dal"), ("hi", "मूंग दाल"), ("te", "పెసర పప్పు"), ("ta", "பாசி பருப்பு")], "Pulses", 110.0, 50, 100, "P2"),
        item("13", &[("en", "Onion"), ("hi", "प्याज़"), ("te", "ఉల్లిపాయ"), ("ta", "வெங்காயம்")], "Veg", 35.0, 100, 200, "V1"),
        item("14", &[("en", "Potato"), ("hi", "आलू"), ("te", "బంగాళాదుంప"), ("ta", "உருளைக்கிழங்கு")], "Veg", 25.0, 150, 300, "V2"),
        item("15", &[("en", "Tomato"), ("hi", "टमाटर"), ("te", "టమాటో"), ("ta", "தக்காளி")], "Veg", 60.0, 80, 100, "V3"),
    ]
}
