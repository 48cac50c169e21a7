//! Demo restaurant used by `mesa seed` and by tests.

use crate::snapshot::Snapshot;
use chrono::{DateTime, Utc};
use mesa_core::catalog::{Banner, Category, Product, Variation, VariationOption};
use mesa_core::money::Money;
use mesa_core::settings::{Branding, DeliveryZone, Settings};

fn category(id: &str, name: &str, description: &str, order: u32, now: DateTime<Utc>) -> Category {
    Category {
        id: id.into(),
        name: name.into(),
        description: Some(description.into()),
        order,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

/// `options` are `(id, name, price delta in whole units)`.
fn group(
    id: &str,
    name: &str,
    required: bool,
    multi_select: bool,
    options: &[(&str, &str, i64)],
) -> Variation {
    Variation {
        id: id.into(),
        name: name.into(),
        options: options
            .iter()
            .map(|(id, name, price)| VariationOption {
                id: (*id).into(),
                name: (*name).into(),
                price: Money::from_major(*price),
            })
            .collect(),
        required,
        multi_select,
    }
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    category_id: &str,
    name: &str,
    description: &str,
    price: i64,
    image: &str,
    order: u32,
    variations: Vec<Variation>,
    now: DateTime<Utc>,
) -> Product {
    let mut product = Product::new(id, category_id, name, Money::from_major(price), now);
    product.description = description.into();
    product.image_url = Some(image.into());
    product.order = order;
    product.variations = variations;
    product
}

fn banner(id: &str, title: &str, image: &str, order: u32, now: DateTime<Utc>) -> Banner {
    Banner {
        id: id.into(),
        title: title.into(),
        image_url: image.into(),
        link: None,
        order,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn demo_settings(now: DateTime<Utc>) -> Settings {
    let mut settings = Settings::new("Tlayudas La Vid", "+50683889614");
    settings.branding = Branding {
        logo_url: None,
        primary_color: "#F4C542".into(),
        secondary_color: "#E67E22".into(),
        accent_color: "#C0392B".into(),
    };
    settings.delivery_zones = vec![
        DeliveryZone {
            id: "centro".into(),
            name: "Centro".into(),
            fee: Money::from_major(30),
            active: true,
        },
        DeliveryZone {
            id: "periferia".into(),
            name: "Periferia".into(),
            fee: Money::from_major(45),
            active: true,
        },
    ];
    settings.updated_at = now;
    settings
}

pub fn demo_snapshot(now: DateTime<Utc>) -> Snapshot {
    let size = |large: i64| {
        group(
            "size",
            "Tamaño",
            true,
            false,
            &[("individual", "Individual", 0), ("grande", "Grande", large)],
        )
    };

    let categories = vec![
        category("tlayudas", "Tlayudas", "Tlayudas tradicionales oaxaqueñas", 1, now),
        category("antojitos", "Antojitos", "Antojitos mexicanos", 2, now),
        category("bebidas", "Bebidas", "Bebidas refrescantes", 3, now),
        category("postres", "Postres", "Postres caseros", 4, now),
    ];

    let products = vec![
        product(
            "tlayuda-tradicional",
            "tlayudas",
            "Tlayuda Tradicional",
            "Tlayuda con asiento, frijoles, quesillo, lechuga, tomate y aguacate",
            85,
            "/tlayuda-tradicional-oaxaque-a.jpg",
            1,
            vec![
                size(35),
                group(
                    "protein",
                    "Proteína",
                    true,
                    false,
                    &[
                        ("tasajo", "Tasajo", 0),
                        ("cecina", "Cecina", 0),
                        ("chorizo", "Chorizo", 0),
                        ("mixta", "Mixta", 15),
                    ],
                ),
                group(
                    "extras",
                    "Extras",
                    false,
                    true,
                    &[
                        ("quesillo", "Quesillo extra", 15),
                        ("aguacate", "Aguacate extra", 10),
                        ("chapulines", "Chapulines", 20),
                    ],
                ),
            ],
            now,
        ),
        product(
            "tlayuda-vegetariana",
            "tlayudas",
            "Tlayuda Vegetariana",
            "Tlayuda con frijoles, quesillo, champiñones, calabaza, lechuga y aguacate",
            75,
            "/tlayuda-vegetariana.jpg",
            2,
            vec![size(30)],
            now,
        ),
        product(
            "quesadillas",
            "antojitos",
            "Quesadillas",
            "Quesadillas de maíz con quesillo oaxaqueño",
            45,
            "/quesadillas-oaxaque-as.jpg",
            1,
            vec![
                group(
                    "filling",
                    "Relleno",
                    true,
                    false,
                    &[
                        ("quesillo", "Solo quesillo", 0),
                        ("champinones", "Quesillo con champiñones", 10),
                        ("flor", "Quesillo con flor de calabaza", 12),
                        ("huitlacoche", "Quesillo con huitlacoche", 15),
                    ],
                ),
                group(
                    "quantity",
                    "Cantidad",
                    true,
                    false,
                    &[("tres", "3 piezas", 0), ("cinco", "5 piezas", 30)],
                ),
            ],
            now,
        ),
        product(
            "memelas",
            "antojitos",
            "Memelas",
            "Memelas con frijoles, quesillo y salsa",
            40,
            "/memelas-oaxaque-as.jpg",
            2,
            vec![group(
                "topping",
                "Con",
                false,
                true,
                &[
                    ("tasajo", "Tasajo", 15),
                    ("cecina", "Cecina", 15),
                    ("chorizo", "Chorizo", 15),
                ],
            )],
            now,
        ),
        product(
            "tacos",
            "antojitos",
            "Tacos",
            "Tacos dorados con lechuga, crema y queso",
            50,
            "/tacos-dorados-mexicanos.jpg",
            3,
            vec![group(
                "filling",
                "Relleno",
                true,
                false,
                &[
                    ("pollo", "Pollo", 0),
                    ("papa", "Papa", 0),
                    ("requeson", "Requesón", 5),
                ],
            )],
            now,
        ),
        product(
            "agua-fresca",
            "bebidas",
            "Agua Fresca",
            "Aguas frescas naturales del día",
            25,
            "/agua-fresca-mexicana.jpg",
            1,
            vec![
                group(
                    "flavor",
                    "Sabor",
                    true,
                    false,
                    &[
                        ("jamaica", "Jamaica", 0),
                        ("horchata", "Horchata", 0),
                        ("tamarindo", "Tamarindo", 0),
                        ("limon", "Limón", 0),
                    ],
                ),
                group(
                    "size",
                    "Tamaño",
                    true,
                    false,
                    &[("chico", "Chico", 0), ("grande", "Grande", 10)],
                ),
            ],
            now,
        ),
        product(
            "refresco",
            "bebidas",
            "Refresco",
            "Refrescos embotellados",
            20,
            "/refresco-mexicano.jpg",
            2,
            vec![group(
                "brand",
                "Marca",
                true,
                false,
                &[
                    ("coca-cola", "Coca-Cola", 0),
                    ("sprite", "Sprite", 0),
                    ("fanta", "Fanta", 0),
                    ("manzanita", "Manzanita", 0),
                ],
            )],
            now,
        ),
        product(
            "cerveza",
            "bebidas",
            "Cerveza",
            "Cervezas nacionales",
            35,
            "/cerveza-mexicana.jpg",
            3,
            vec![group(
                "brand",
                "Marca",
                true,
                false,
                &[
                    ("corona", "Corona", 0),
                    ("victoria", "Victoria", 0),
                    ("modelo", "Modelo", 5),
                    ("indio", "Indio", 0),
                ],
            )],
            now,
        ),
        product(
            "flan-napolitano",
            "postres",
            "Flan Napolitano",
            "Flan casero estilo napolitano",
            35,
            "/flan-napolitano.jpg",
            1,
            Vec::new(),
            now,
        ),
        product(
            "gelatina",
            "postres",
            "Gelatina",
            "Gelatina de leche con fruta",
            30,
            "/gelatina-de-leche.jpg",
            2,
            vec![group(
                "flavor",
                "Sabor",
                true,
                false,
                &[
                    ("fresa", "Fresa", 0),
                    ("mosaico", "Mosaico", 0),
                    ("rompope", "Rompope", 5),
                ],
            )],
            now,
        ),
    ];

    let banners = vec![
        banner(
            "bienvenida",
            "Bienvenido a Tlayudas La Vid",
            "/banner-tlayudas-oaxaque-as-restaurante.jpg",
            1,
            now,
        ),
        banner(
            "promocion",
            "Promoción Especial",
            "/promocion-comida-mexicana-descuento.jpg",
            2,
            now,
        ),
        banner(
            "nuevos-sabores",
            "Nuevos Sabores",
            "/antojitos-mexicanos-variedad.jpg",
            3,
            now,
        ),
    ];

    Snapshot {
        settings: Some(demo_settings(now)),
        categories,
        products,
        banners,
        orders: Vec::new(),
    }
}
