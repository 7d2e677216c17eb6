//! Helpers shared by the unit tests: in-memory ZIP building and a tiny
//! HTTP server answering canned bodies by request path.

use anyhow::Result;
use std::{
    collections::HashMap,
    fs::File,
    io::{Cursor, Read, Write},
    net::SocketAddr,
    path::Path,
    sync::Arc,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use zip::{write::FileOptions, CompressionMethod, ZipArchive};

pub fn build_zip(entries: &[(&str, &str)]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, data) in entries {
            zip.start_file(*name, options.clone())?;
            zip.write_all(data.as_bytes())?;
        }
        zip.finish()?;
    }
    Ok(buf)
}

/// Serve `routes` (path → body) on an ephemeral local port. Unknown paths get a 404.
pub async fn serve(routes: HashMap<String, Vec<u8>>) -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match sock.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&request);
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = match routes.get(&path) {
                    Some(body) => ("200 OK", body.clone()),
                    None => ("404 Not Found", b"not found".to_vec()),
                };
                let header = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = sock.write_all(header.as_bytes()).await;
                let _ = sock.write_all(&body).await;
                let _ = sock.shutdown().await;
            });
        }
    });

    Ok(addr)
}

/// An HTML directory listing linking to `hrefs`, shaped like the CVM index page.
pub fn listing_html(hrefs: &[&str]) -> Vec<u8> {
    let mut html = String::from(
        "<html><head><title>Index of /dados/</title></head><body><h1>Index of /dados/</h1><pre>\
         <a href=\"../\">../</a>\n",
    );
    for href in hrefs {
        html.push_str(&format!(
            "<a href=\"{href}\">{href}</a>    01-Jan-2024 10:00    1M\n"
        ));
    }
    html.push_str("</pre></body></html>");
    html.into_bytes()
}

/// All XML parts of an xlsx file, concatenated.
pub fn workbook_xml(path: &Path) -> Result<String> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut xml = String::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.name().ends_with(".xml") {
            entry.read_to_string(&mut xml)?;
        }
    }
    Ok(xml)
}
