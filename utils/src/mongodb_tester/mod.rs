use std::thread;

use mongodb::Database;
use tokio::runtime::Runtime;

/// throwaway mongodb database with a unique name, dropped on Drop
pub struct MongoDbTester {
    pub host: String,
    pub port: u16,
    dbname: String,
}

impl MongoDbTester {
    pub async fn new(host: impl Into<String>, port: u16) -> MongoDbTester {
        let dbname = format!("test_{}", uuid::Uuid::new_v4().simple());
        MongoDbTester {
            host: host.into(),
            port,
            dbname,
        }
    }

    pub fn server_url(&self) -> String {
        format!("mongodb://{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        format!("{}/{}", self.server_url(), self.dbname)
    }

    pub fn dbname(&self) -> String {
        self.dbname.clone()
    }

    pub async fn database(&self) -> Database {
        mongodb::Client::with_uri_str(self.url())
            .await
            .unwrap()
            .database(&self.dbname)
    }
}

impl Drop for MongoDbTester {
    fn drop(&mut self) {
        let server_url = self.server_url();
        let dbname = self.dbname.clone();
        // drop database
        thread::spawn(move || {
            Runtime::new().unwrap().block_on(async move {
                let client = mongodb::Client::with_uri_str(server_url).await.unwrap();
                if let Err(e) = client.database(&dbname).drop(None).await {
                    println!("drop database error: {}", e);
                }
            });
        })
        .join()
        .unwrap();
    }
}
