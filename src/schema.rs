//! Sample schema: customers (`clientes`), products (`produtos`) and
//! transactions (`transacoes`). The description is handed to the model verbatim.

pub const SCHEMA_DESCRIPTION: &str = r#"
CREATE TABLE clientes (
  id SERIAL PRIMARY KEY,
  nome VARCHAR(255) NOT NULL,
  email VARCHAR(255) UNIQUE NOT NULL,
  saldo DECIMAL(10, 2) NOT NULL
);

CREATE TABLE produtos (
  id SERIAL PRIMARY KEY,
  nome VARCHAR(255) NOT NULL,
  preco DECIMAL(10, 2) NOT NULL,
  categoria VARCHAR(255) NOT NULL
);

CREATE TABLE transacoes (
  id SERIAL PRIMARY KEY,
  cliente_id INTEGER REFERENCES clientes(id),
  produto_id INTEGER REFERENCES produtos(id),
  data_compra TIMESTAMP NOT NULL,
  quantidade INTEGER NOT NULL,
  valor_total DECIMAL(10, 2) NOT NULL
);
"#;

pub const RELATIONSHIPS: &str = "\
- One customer (clientes) can have many transactions (transacoes): 1 to N
- Each transaction (transacoes) references exactly one product (produtos): N to 1";

pub const CREATE_TABLES: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS clientes (
        id SERIAL PRIMARY KEY,
        nome VARCHAR(255) NOT NULL,
        email VARCHAR(255) UNIQUE NOT NULL,
        saldo DECIMAL(10, 2) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS produtos (
        id SERIAL PRIMARY KEY,
        nome VARCHAR(255) NOT NULL,
        preco DECIMAL(10, 2) NOT NULL,
        categoria VARCHAR(255) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transacoes (
        id SERIAL PRIMARY KEY,
        cliente_id INTEGER REFERENCES clientes(id),
        produto_id INTEGER REFERENCES produtos(id),
        data_compra TIMESTAMP NOT NULL,
        quantidade INTEGER NOT NULL,
        valor_total DECIMAL(10, 2) NOT NULL
    )
    "#,
];

pub const INSERT_CUSTOMERS: &str = r#"
INSERT INTO clientes (nome, email, saldo)
VALUES
    ('Ana Silva', 'ana.silva@email.com', 5000.00),
    ('Bruno Costa', 'bruno.costa@email.com', 3500.00),
    ('Carla Oliveira', 'carla.oliveira@email.com', 2000.00),
    ('Daniel Santos', 'daniel.santos@email.com', 7500.00),
    ('Elena Martins', 'elena.martins@email.com', 1200.00)
ON CONFLICT (email) DO NOTHING
"#;

pub const INSERT_PRODUCTS: &str = r#"
INSERT INTO produtos (nome, preco, categoria)
VALUES
    ('Notebook Dell XPS', 4999.99, 'Eletrônicos'),
    ('Smartphone Samsung Galaxy', 2499.99, 'Eletrônicos'),
    ('Monitor LG 27"', 1299.99, 'Eletrônicos'),
    ('Teclado Mecânico', 349.99, 'Periféricos'),
    ('Mouse Gamer', 199.99, 'Periféricos'),
    ('Headset Wireless', 599.99, 'Áudio'),
    ('Tablet iPad', 3499.99, 'Eletrônicos'),
    ('Notebook Lenovo ThinkPad', 5499.99, 'Eletrônicos'),
    ('Smartphone iPhone', 4999.99, 'Eletrônicos')
"#;

pub const INSERT_TRANSACTIONS: &str = r#"
INSERT INTO transacoes (cliente_id, produto_id, data_compra, quantidade, valor_total)
VALUES
    (1, 1, '2023-10-15 10:30:00', 1, 4999.99),
    (1, 4, '2023-10-16 14:20:00', 1, 349.99),
    (2, 2, '2023-10-10 09:15:00', 1, 2499.99),
    (3, 5, '2023-10-12 16:45:00', 2, 399.98),
    (4, 1, '2023-10-05 11:30:00', 1, 4999.99),
    (4, 3, '2023-10-05 11:35:00', 2, 2599.98),
    (4, 6, '2023-10-06 15:20:00', 1, 599.99),
    (5, 5, '2023-10-18 13:10:00', 1, 199.99),
    (2, 8, '2023-10-20 10:00:00', 1, 5499.99),
    (3, 7, '2023-10-22 14:30:00', 1, 3499.99)
"#;

/// Questions offered as starting points by the CLI.
pub const EXAMPLE_QUESTIONS: [&str; 3] = [
    "Quais clientes compraram um Notebook?",
    "Quanto cada cliente gastou no total?",
    "Quem tem saldo suficiente para comprar um Smartphone?",
];
